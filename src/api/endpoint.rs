//! URL construction: API root joining, URI templates and query merging.

use std::collections::HashSet;

use url::Url;

/// Query and template parameters for a request.
///
/// Keys keep their insertion order and a key may carry several values,
/// which are sent as repeated pairs (`labels=bug&labels=p1`).
///
/// ```
/// use gitlab_sansio::api::Params;
///
/// let params = Params::new()
///     .with("state", "opened")
///     .with_all("labels", ["bug", "p1"]);
/// assert_eq!(params.get("state"), Some("opened"));
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, Vec<String>)>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Sets `key` to a single value, replacing any previous values.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, vec![value.into()]);
        self
    }

    /// Sets `key` to several values, replacing any previous values.
    #[must_use]
    pub fn with_all<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.insert(key, values.into_iter().map(Into::into).collect());
        self
    }

    /// Sets `key` to `values`, keeping the key's original position.
    pub fn insert(&mut self, key: impl Into<String>, values: Vec<String>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((key, values)),
        }
    }

    /// First value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key)?.first().map(String::as_str)
    }

    /// All values of `key`.
    #[must_use]
    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no keys are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over keys and their values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |params, (k, v)| params.with(k, v))
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Computes the API root, e.g. `https://gitlab.com/api/v4/`.
///
/// Any path on `base` is replaced, as GitLab serves the API from the host
/// root.
///
/// # Errors
///
/// Returns an error if `base` is not an absolute URL.
pub fn api_root(base: &str, api_version: &str) -> Result<Url, url::ParseError> {
    Url::parse(base)?.join(&format!("/api/{api_version}/"))
}

/// Builds the full URL for `path`.
///
/// - URI template expressions in `path` are expanded from `params`
/// - absolute URLs are kept; relative ones (with or without a leading
///   slash) are resolved against `api_root`
/// - params not used by the template are merged into the query string:
///   an existing key is replaced where it stands, new keys are appended
///
/// ```
/// use gitlab_sansio::api::{Params, api_root, format_url};
///
/// let root = api_root("https://gitlab.com", "v4").unwrap();
/// let params = Params::new().with("id", "group/project").with("state", "opened");
///
/// let url = format_url(&root, "/projects{/id}/issues", &params).unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://gitlab.com/api/v4/projects/group%2Fproject/issues?state=opened"
/// );
/// ```
///
/// # Errors
///
/// Returns an error if the expanded path cannot be resolved to a URL.
pub fn format_url(api_root: &Url, path: &str, params: &Params) -> Result<Url, url::ParseError> {
    let (expanded, consumed) = expand_template(path, params);
    let mut url = api_root.join(expanded.trim_start_matches('/'))?;

    let remaining: Vec<(&str, &[String])> = params
        .iter()
        .filter(|(key, _)| !consumed.contains(*key))
        .collect();
    if !remaining.is_empty() {
        merge_query(&mut url, &remaining);
    }
    Ok(url)
}

/// The params `path`'s template does not reference, i.e. those that end up
/// in the query string.
pub(crate) fn query_params(path: &str, params: &Params) -> Params {
    let (_, consumed) = expand_template(path, params);
    Params {
        entries: params
            .iter()
            .filter(|(key, _)| !consumed.contains(*key))
            .map(|(key, values)| (key.to_string(), values.to_vec()))
            .collect(),
    }
}

fn merge_query(url: &mut Url, params: &[(&str, &[String])]) {
    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

    for (key, values) in params {
        let new_pairs = values.iter().map(|v| ((*key).to_string(), v.clone()));
        match pairs.iter().position(|(k, _)| k == key) {
            Some(index) => {
                pairs.retain(|(k, _)| k != key);
                let tail = pairs.split_off(index.min(pairs.len()));
                pairs.extend(new_pairs);
                pairs.extend(tail);
            }
            None => pairs.extend(new_pairs),
        }
    }

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
}

/// Expands `{var}`, `{+var}`, `{/var}`, `{?a,b}` and `{&a}` expressions.
///
/// Undefined variables are dropped. Returns the expanded string and the
/// names of the params referenced by any expression.
fn expand_template<'a>(template: &str, params: &'a Params) -> (String, HashSet<&'a str>) {
    let mut out = String::with_capacity(template.len());
    let mut consumed = HashSet::new();
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let expression = &rest[start + 1..start + len];
        rest = &rest[start + len + 1..];

        let (operator, names) = match expression.chars().next() {
            Some(op @ ('+' | '/' | '?' | '&')) => (Some(op), &expression[1..]),
            _ => (None, expression),
        };

        let defined: Vec<(&str, &[String])> = names
            .split(',')
            .map(str::trim)
            .filter_map(|name| {
                params.iter().find(|(key, _)| *key == name).map(|entry| {
                    consumed.insert(entry.0);
                    entry
                })
            })
            .collect();
        if defined.is_empty() {
            continue;
        }

        // List items are encoded one by one; the separating comma stays literal
        let allow_reserved = operator == Some('+');
        let values = defined
            .iter()
            .map(|(_, v)| encode_list(v, allow_reserved));
        match operator {
            None | Some('+') => push_joined(&mut out, "", ",", values),
            Some('/') => push_joined(&mut out, "/", "/", values),
            Some(op) => {
                let first = if op == '?' { "?" } else { "&" };
                let pairs = defined
                    .iter()
                    .map(|(k, v)| format!("{k}={}", encode_list(v, false)));
                push_joined(&mut out, first, "&", pairs);
            }
        }
    }
    out.push_str(rest);
    (out, consumed)
}

fn push_joined(out: &mut String, first: &str, sep: &str, parts: impl Iterator<Item = String>) {
    out.push_str(first);
    out.push_str(&parts.collect::<Vec<_>>().join(sep));
}

fn encode_list(values: &[String], allow_reserved: bool) -> String {
    values
        .iter()
        .map(|v| encode(v, allow_reserved))
        .collect::<Vec<_>>()
        .join(",")
}

/// Percent-encodes everything outside the unreserved set, and outside the
/// reserved set too when `allow_reserved`.
fn encode(value: &str, allow_reserved: bool) -> String {
    const RESERVED: &[u8] = b":/?#[]@!$&'()*+,;=%";

    let mut encoded = String::with_capacity(value.len());
    for &byte in value.as_bytes() {
        let keep = byte.is_ascii_alphanumeric()
            || matches!(byte, b'-' | b'.' | b'_' | b'~')
            || (allow_reserved && RESERVED.contains(&byte));
        if keep {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}
