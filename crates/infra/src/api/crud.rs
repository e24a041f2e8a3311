//! Generic CRUD dispatch
//!
//! Path-building helpers shared by every resource operation. Each one joins
//! a base path with optional suffix segments, validates identifiers before
//! any I/O, executes the request and decodes into the caller's type.
//! A `204 No Content` reply is a success: single-resource helpers yield
//! `None` and list helpers an empty list.
//! Request and response shapes are independent type parameters: many
//! endpoints accept a partial write shape and answer with a richer read
//! shape.

use lookerkit_domain::{ArgError, Identifier, ListOptions};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWrite;

use super::client::{ApiResponse, Client};
use super::errors::ApiResult;

/// Join `base` and `suffix` segments with single slashes
///
/// Leading and trailing slashes on every piece are normalized and empty
/// pieces are skipped, so the result never has doubled or missing
/// separators. A query string on `base` is not supported; use
/// [`with_query`] on the joined path.
pub fn join_path(base: &str, suffix: &[&str]) -> String {
    let mut path = base.trim_end_matches('/').to_string();
    for segment in suffix {
        let segment = segment.trim_matches('/');
        if segment.is_empty() {
            continue;
        }
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(segment);
    }
    path
}

/// Append URL-encoded query pairs to `path`
pub fn with_query<K, V>(path: &str, pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if pairs.is_empty() {
        return path.to_string();
    }

    let query = pairs
        .iter()
        .map(|(k, v)| {
            format!("{}={}", urlencoding::encode(k.as_ref()), urlencoding::encode(v.as_ref()))
        })
        .collect::<Vec<_>>()
        .join("&");
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{query}")
}

fn or_empty<T>((items, response): (Option<Vec<T>>, ApiResponse)) -> (Vec<T>, ApiResponse) {
    (items.unwrap_or_default(), response)
}

impl Client {
    /// `GET <path>[/<suffix>...]`
    pub async fn get<T>(
        &self,
        path: &str,
        suffix: &[&str],
    ) -> ApiResult<(Option<T>, ApiResponse)>
    where
        T: DeserializeOwned,
    {
        let request = self.new_request::<()>(Method::GET, &join_path(path, suffix), None)?;
        self.execute(request).await
    }

    /// `GET <base>/<id>`
    ///
    /// # Errors
    ///
    /// Numeric ids below 1 and empty slugs fail with an argument error
    /// before any request is sent
    pub async fn get_by_id<T>(
        &self,
        base: &str,
        id: impl Into<Identifier>,
    ) -> ApiResult<(Option<T>, ApiResponse)>
    where
        T: DeserializeOwned,
    {
        let id = id.into();
        id.validate("id")?;

        let segment = id.path_segment();
        self.get(base, &[segment.as_ref()]).await
    }

    /// `GET <base>[/<suffix>...][?limit=&offset=]`
    ///
    /// Only explicitly supplied (non-zero) pagination values are sent.
    pub async fn list<T>(
        &self,
        base: &str,
        options: Option<&ListOptions>,
        suffix: &[&str],
    ) -> ApiResult<(Vec<T>, ApiResponse)>
    where
        T: DeserializeOwned,
    {
        let pairs = options.map(ListOptions::query_pairs).unwrap_or_default();
        let path = with_query(&join_path(base, suffix), &pairs);
        let request = self.new_request::<()>(Method::GET, &path, None)?;
        Ok(or_empty(self.execute(request).await?))
    }

    /// `GET <search_path>?<filter>[&limit=&offset=]`
    ///
    /// `filter` carries arbitrary caller-supplied parameters such as
    /// `name` or `email`.
    pub async fn list_by_filter<T>(
        &self,
        search_path: &str,
        filter: &[(&str, &str)],
        options: Option<&ListOptions>,
    ) -> ApiResult<(Vec<T>, ApiResponse)>
    where
        T: DeserializeOwned,
    {
        let mut pairs: Vec<(&str, String)> =
            filter.iter().map(|(k, v)| (*k, (*v).to_string())).collect();
        pairs.extend(options.map(ListOptions::query_pairs).unwrap_or_default());

        let path = with_query(search_path, &pairs);
        let request = self.new_request::<()>(Method::GET, &path, None)?;
        Ok(or_empty(self.execute(request).await?))
    }

    /// `POST <base>[/<suffix>...]` with `body`, decoding the created resource
    pub async fn create<B, T>(
        &self,
        base: &str,
        body: &B,
        suffix: &[&str],
    ) -> ApiResult<(Option<T>, ApiResponse)>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.new_request(Method::POST, &join_path(base, suffix), Some(body))?;
        self.execute(request).await
    }

    /// `POST <base>[/<suffix>...][?query]` without a body
    ///
    /// For action endpoints that take their inputs from the query string.
    pub async fn post_empty<T>(
        &self,
        base: &str,
        query: &[(&str, &str)],
        suffix: &[&str],
    ) -> ApiResult<(Option<T>, ApiResponse)>
    where
        T: DeserializeOwned,
    {
        let path = with_query(&join_path(base, suffix), query);
        let request = self.new_request::<()>(Method::POST, &path, None)?;
        self.execute(request).await
    }

    /// `PATCH <base>/<id>[/<suffix>...]` with `body`
    ///
    /// # Errors
    ///
    /// Same identifier validation as [`Client::get_by_id`]
    pub async fn update<B, T>(
        &self,
        base: &str,
        id: impl Into<Identifier>,
        body: &B,
        suffix: &[&str],
    ) -> ApiResult<(Option<T>, ApiResponse)>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let id = id.into();
        id.validate("id")?;

        let segment = id.path_segment();
        let mut segments = vec![segment.as_ref()];
        segments.extend_from_slice(suffix);

        let path = join_path(base, &segments);
        let request = self.new_request(Method::PATCH, &path, Some(body))?;
        self.execute(request).await
    }

    /// `PUT <base>[/<suffix>...]` with the id list as the entire body
    ///
    /// Replaces the whole membership relation. An empty list is rejected:
    /// clearing a relation is not expressed through this call.
    ///
    /// # Errors
    ///
    /// Empty `ids` or an invalid member id fail with an argument error
    /// before any request is sent
    pub async fn set<T>(
        &self,
        base: &str,
        ids: &[Identifier],
        suffix: &[&str],
    ) -> ApiResult<(Option<T>, ApiResponse)>
    where
        T: DeserializeOwned,
    {
        if ids.is_empty() {
            return Err(ArgError::new("ids", "cannot be empty").into());
        }
        for id in ids {
            id.validate("ids")?;
        }

        let request = self.new_request(Method::PUT, &join_path(base, suffix), Some(ids))?;
        self.execute(request).await
    }

    /// `DELETE <base>/<id>[/<suffix>...]`
    ///
    /// # Errors
    ///
    /// Same identifier validation as [`Client::get_by_id`]
    pub async fn delete(
        &self,
        base: &str,
        id: impl Into<Identifier>,
        suffix: &[&str],
    ) -> ApiResult<ApiResponse> {
        let id = id.into();
        id.validate("id")?;

        let segment = id.path_segment();
        let mut segments = vec![segment.as_ref()];
        segments.extend_from_slice(suffix);

        let request = self.new_request::<()>(Method::DELETE, &join_path(base, &segments), None)?;
        self.execute_discard(request).await
    }

    /// `POST <path>` adding one member to a collection
    ///
    /// Decodes into the collection's element type rather than a creation
    /// result.
    pub async fn add_member<B, T>(
        &self,
        path: &str,
        member: &B,
    ) -> ApiResult<(Option<T>, ApiResponse)>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.new_request(Method::POST, path, Some(member))?;
        self.execute(request).await
    }

    /// `GET <path>[/<suffix>...]` streaming the raw body into `sink`
    pub async fn download<W>(&self, path: &str, suffix: &[&str], sink: &mut W) -> ApiResult<ApiResponse>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let request = self.new_request::<()>(Method::GET, &join_path(path, suffix), None)?;
        self.execute_to_writer(request, sink).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("4.0/groups", &[]), "4.0/groups");
        assert_eq!(join_path("4.0/groups/", &["12"]), "4.0/groups/12");
        assert_eq!(join_path("4.0/groups", &["/12/", "/users"]), "4.0/groups/12/users");
        assert_eq!(join_path("4.0/groups", &["", "12", ""]), "4.0/groups/12");
        assert_eq!(join_path("", &["4.0", "user"]), "4.0/user");
    }

    #[test]
    fn test_with_query() {
        let none: [(&str, &str); 0] = [];
        assert_eq!(with_query("4.0/users", &none), "4.0/users");
        assert_eq!(with_query("4.0/users/search", &[("email", "a+b@x.io")]), "4.0/users/search?email=a%2Bb%40x.io");
        assert_eq!(with_query("4.0/x?a=1", &[("b", "2")]), "4.0/x?a=1&b=2");
    }
}
