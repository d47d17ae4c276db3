//! Encoding a schema instance back into a URL query string.

use crate::schema::QueryParams;

/// How names and values are written into the query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum UrlEncoding {
    /// `name=value` using each value's natural string form, nothing is escaped.
    ///
    /// A value containing `&`, `=` or `#` produces a query string that will not decode back to the
    /// same value.
    #[default]
    Raw,
    /// `application/x-www-form-urlencoded`: reserved bytes are percent-encoded, spaces become `+`.
    Percent,
}

/// Encodes the explicitly supplied fields of `params` as `?a=b&c=d`, without escaping.
///
/// Returns `None` when no field was explicitly supplied.
pub fn to_url<S: QueryParams>(params: &S) -> Option<String> {
    to_url_with(params, UrlEncoding::Raw)
}

pub fn to_url_with<S: QueryParams>(params: &S, encoding: UrlEncoding) -> Option<String> {
    let pairs = params.query_pairs();
    if pairs.is_empty() {
        return None;
    }

    let query = match encoding {
        UrlEncoding::Raw => pairs.iter().map(|(name, value)| format!("{name}={value}")).collect::<Vec<_>>().join("&"),
        UrlEncoding::Percent => {
            let mut serializer = form_urlencoded::Serializer::new(String::new());
            serializer.extend_pairs(&pairs);
            serializer.finish()
        }
    };

    Some(format!("?{query}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::QueryArgs;
    use crate::error::ValidationErrors;
    use crate::field::FieldDescriptor;
    use crate::schema::FieldName;

    // hand written so the encoder is tested without the attribute macro
    struct Search {
        pairs: Vec<(&'static str, String)>,
    }

    impl QueryParams for Search {
        const NAME: &'static str = "Search";
        const FIELD_NAMES: &'static [FieldName] = &[FieldName::Param("q"), FieldName::Param("lang")];

        fn fields() -> Vec<FieldDescriptor> {
            vec![FieldDescriptor::of::<Option<String>>("q"), FieldDescriptor::of::<Option<String>>("lang")]
        }

        fn construct(args: &QueryArgs) -> Result<Self, ValidationErrors> {
            let pairs = ["q", "lang"]
                .into_iter()
                .filter_map(|name| args.get(name).map(|value| (name, value.to_owned())))
                .collect();
            Ok(Self { pairs })
        }

        fn query_pairs(&self) -> Vec<(&'static str, String)> {
            self.pairs.clone()
        }
    }

    #[test]
    fn test_nothing_set() {
        let search = Search::from_pairs(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(to_url(&search), None);
        assert_eq!(to_url_with(&search, UrlEncoding::Percent), None);
    }

    #[test]
    fn test_raw_keeps_values_verbatim() {
        let search = Search::from_pairs([("lang", "en"), ("q", "a&b c")]).unwrap();
        assert_eq!(to_url(&search).as_deref(), Some("?q=a&b c&lang=en"));
    }

    #[test]
    fn test_percent_encoding() {
        let search = Search::from_pairs([("q", "a&b c=d")]).unwrap();
        assert_eq!(search.to_url_with(UrlEncoding::Percent).as_deref(), Some("?q=a%26b+c%3Dd"));
    }
}
