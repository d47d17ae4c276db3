use proc_macro2::Span;
use syn::ext::IdentExt;
use syn::{Attribute, Expr, ExprLit, Field, Ident, Lit, LitStr, Meta, Type};

///
/// Bound
///
/// one numeric or length constraint given in `#[param(...)]`
///

pub struct Bound {
    pub kind: BoundKind,
    pub expr: Expr,
}

#[derive(Clone, Copy)]
pub enum BoundKind {
    Ge,
    Gt,
    Le,
    Lt,
    MinLength,
    MaxLength,
}

impl BoundKind {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "ge" => Some(Self::Ge),
            "gt" => Some(Self::Gt),
            "le" => Some(Self::Le),
            "lt" => Some(Self::Lt),
            "min_length" => Some(Self::MinLength),
            "max_length" => Some(Self::MaxLength),
            _ => None,
        }
    }

    pub fn variant(self) -> Ident {
        let name = match self {
            Self::Ge => "Ge",
            Self::Gt => "Gt",
            Self::Le => "Le",
            Self::Lt => "Lt",
            Self::MinLength => "MinLength",
            Self::MaxLength => "MaxLength",
        };
        Ident::new(name, Span::call_site())
    }

    pub fn is_length(self) -> bool {
        matches!(self, Self::MinLength | Self::MaxLength)
    }
}

///
/// Default
///

pub enum DefaultAttr {
    /// no default given: `Option<T>` is absent, anything else is required
    Implicit,
    /// bare `default`: `Default::default()`
    Trait,
    Expr(Expr),
}

///
/// ParamField
///
/// everything the macro needs to know about one struct field
///

pub struct ParamField {
    pub ident: Ident,
    pub ty: Type,
    pub name: String,
    pub default: DefaultAttr,
    pub description: Option<String>,
    pub bounds: Vec<Bound>,
    pub flatten: bool,
}

impl ParamField {
    pub fn parse(field: &Field) -> syn::Result<Self> {
        let ident = field.ident.clone().ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;

        let mut rename: Option<LitStr> = None;
        let mut default = DefaultAttr::Implicit;
        let mut description: Option<LitStr> = None;
        let mut bounds = Vec::new();
        let mut flatten = false;
        let mut keys = 0_usize;

        for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("param")) {
            attr.parse_nested_meta(|meta| {
                keys += 1;
                let key = meta.path.get_ident().map(ToString::to_string).unwrap_or_default();

                if key == "flatten" {
                    flatten = true;
                } else if key == "default" {
                    default = if meta.input.peek(syn::Token![=]) {
                        DefaultAttr::Expr(meta.value()?.parse()?)
                    } else {
                        DefaultAttr::Trait
                    };
                } else if key == "description" {
                    description = Some(meta.value()?.parse()?);
                } else if key == "rename" {
                    rename = Some(meta.value()?.parse()?);
                } else if let Some(kind) = BoundKind::from_key(&key) {
                    bounds.push(Bound { kind, expr: meta.value()?.parse()? });
                } else {
                    return Err(meta.error(format!("unknown `param` attribute `{key}`")));
                }

                Ok(())
            })?;
        }

        if flatten && keys > 1 {
            return Err(syn::Error::new_spanned(&ident, "`flatten` cannot be combined with other `param` attributes"));
        }

        let name = rename.map_or_else(|| ident.unraw().to_string(), |lit| lit.value());
        let description = description.map(|lit| lit.value()).or_else(|| doc_comment(&field.attrs));

        Ok(Self { ident, ty: field.ty.clone(), name, default, description, bounds, flatten })
    }
}

// joins the `///` lines of a field into one line
fn doc_comment(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit { lit: Lit::Str(lit), .. }) => Some(lit.value().trim().to_owned()),
                _ => None,
            },
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() { None } else { Some(lines.join(" ")) }
}
