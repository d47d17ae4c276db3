use proc_macro::TokenStream;

mod attr;
mod expand;

/// Turns a struct with named fields into a `micro_qp::QueryParams` schema.
///
/// Every field becomes one query parameter, in declaration order. The field's type decides how the
/// raw value is decoded; `Option<T>` fields may be left out of the query string.
///
/// Field attributes, all inside `#[param(...)]`:
///
/// - `default` / `default = expr`: value used when the parameter is absent. `expr` must have the
///   field's exact type: write `default = "asc".to_owned()` for a `String` and
///   `default = Some(5)` for an `Option<u32>`.
/// - `description = "..."`: help text, defaults to the field's doc comment
/// - `rename = "..."`: parameter name, defaults to the field name
/// - `ge`, `gt`, `le`, `lt`: numeric bounds. Any integer or float literal or constant, compared as
///   `f64`; integer literals are not limited to the `i32` range.
/// - `min_length`, `max_length`: string length bounds
/// - `flatten`: the field is itself a schema whose parameters are inlined here
///
/// Parameter names must be unique across the struct and every schema it flattens. A repeated name
/// is a compile error, raised when the struct is defined, or for a generic struct when it is first
/// used with concrete types.
///
/// ```
/// use micro_qp::{query_params, QueryParams};
///
/// #[query_params]
/// struct Feed {
///     #[param(default = "new".to_owned())]
///     sort: String,
///     #[param(default = Some(3), ge = 1, le = 10)]
///     depth: Option<u8>,
///     #[param(le = 10_000_000_000)]
///     before: Option<u64>,
/// }
///
/// let feed = Feed::from_pairs([("before", "9000000000")]).unwrap();
/// assert_eq!(feed.sort, "new");
/// assert_eq!(feed.depth, Some(3));
/// assert_eq!(feed.before, Some(9_000_000_000));
/// ```
///
/// ```compile_fail
/// use micro_qp::query_params;
///
/// #[query_params]
/// struct Range {
///     since: Option<String>,
/// }
///
/// #[query_params]
/// struct Twice {
///     #[param(flatten)]
///     first: Range,
///     #[param(flatten)]
///     second: Range,
/// }
/// ```
///
/// The struct gets a hidden field recording which parameters were explicitly supplied, so it
/// should be built through `QueryParams::construct` rather than a struct literal.
#[proc_macro_attribute]
pub fn query_params(args: TokenStream, input: TokenStream) -> TokenStream {
    expand::expand_query_params(args.into(), input.into()).into()
}
