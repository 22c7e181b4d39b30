use std::convert::Infallible;

use axum::{
    Form,
    extract::{FromRequest, Multipart, Request},
    http::header,
};
use tracing::debug;

/// `title`/`completed` from a url-encoded or multipart body. Missing fields
/// read as empty text and a repeated key keeps its first value. A body that
/// cannot be read as a form at all (wrong or missing content type, broken
/// multipart framing) reads as if every field were missing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TodoForm {
    pub title: String,
    pub completed: String,
}

impl TodoForm {
    pub fn completed_flag(&self) -> i32 {
        parse_completed(&self.completed)
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut title = None;
        let mut completed = None;
        for (key, value) in pairs {
            match key.as_str() {
                "title" => {
                    title.get_or_insert(value);
                }
                "completed" => {
                    completed.get_or_insert(value);
                }
                _ => {}
            }
        }
        Self {
            title: title.unwrap_or_default(),
            completed: completed.unwrap_or_default(),
        }
    }
}

impl<S> FromRequest<S> for TodoForm
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let pairs = if is_multipart(&req) {
            multipart_pairs(req, state).await
        } else {
            urlencoded_pairs(req, state).await
        };
        Ok(pairs.map(Self::from_pairs).unwrap_or_default())
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        })
}

async fn urlencoded_pairs<S>(req: Request, state: &S) -> Option<Vec<(String, String)>>
where
    S: Send + Sync,
{
    match Form::<Vec<(String, String)>>::from_request(req, state).await {
        Ok(Form(pairs)) => Some(pairs),
        Err(rejection) => {
            debug!(%rejection, "unreadable form body, using empty fields");
            None
        }
    }
}

// File parts are skipped; only plain value parts carry form fields.
async fn multipart_pairs<S>(req: Request, state: &S) -> Option<Vec<(String, String)>>
where
    S: Send + Sync,
{
    let mut multipart = match Multipart::from_request(req, state).await {
        Ok(multipart) => multipart,
        Err(rejection) => {
            debug!(%rejection, "unreadable multipart body, using empty fields");
            return None;
        }
    };

    let mut pairs = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Some(pairs),
            Err(err) => {
                debug!(error = %err, "broken multipart body, using empty fields");
                return None;
            }
        };
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match field.text().await {
            Ok(value) => pairs.push((name, value)),
            Err(err) => {
                debug!(error = %err, "broken multipart body, using empty fields");
                return None;
            }
        }
    }
}

/// Integer value of a text field, 0 when it does not parse.
pub fn parse_completed(raw: &str) -> i32 {
    raw.parse().unwrap_or(0)
}

/// Path ids are unsigned integers; anything else cannot name a row.
pub fn parse_id(raw: &str) -> Option<u32> {
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, extract::FromRequest, http::Request};

    use super::{TodoForm, parse_completed, parse_id};

    #[test]
    fn completed_parses_integers_and_defaults_to_zero() {
        assert_eq!(parse_completed("1"), 1);
        assert_eq!(parse_completed("0"), 0);
        assert_eq!(parse_completed("2"), 2);
        assert_eq!(parse_completed("-1"), -1);
        assert_eq!(parse_completed(""), 0);
        assert_eq!(parse_completed("true"), 0);
        assert_eq!(parse_completed(" 1"), 0);
        assert_eq!(parse_completed("99999999999"), 0);
    }

    #[test]
    fn ids_must_be_unsigned_integers() {
        assert_eq!(parse_id("12"), Some(12));
        assert_eq!(parse_id("0"), Some(0));
        assert_eq!(parse_id("-3"), None);
        assert_eq!(parse_id("abc"), None);
    }

    #[tokio::test]
    async fn url_encoded_bodies_are_read() {
        let request = Request::builder()
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("title=Buy+milk&completed=1"))
            .expect("request should build");

        let form = TodoForm::from_request(request, &())
            .await
            .expect("extraction is infallible");
        assert_eq!(form.title, "Buy milk");
        assert_eq!(form.completed_flag(), 1);
    }

    #[tokio::test]
    async fn missing_fields_read_as_empty() {
        let request = Request::builder()
            .method("PUT")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("completed=1"))
            .expect("request should build");

        let form = TodoForm::from_request(request, &())
            .await
            .expect("extraction is infallible");
        assert_eq!(form.title, "");
        assert_eq!(form.completed_flag(), 1);
    }

    #[tokio::test]
    async fn repeated_keys_keep_the_first_value() {
        let request = Request::builder()
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("title=Buy+milk&completed=1&title=again&completed=0"))
            .expect("request should build");

        let form = TodoForm::from_request(request, &())
            .await
            .expect("extraction is infallible");
        assert_eq!(form.title, "Buy milk");
        assert_eq!(form.completed_flag(), 1);
    }

    #[tokio::test]
    async fn multipart_bodies_are_read() {
        let body = "--XBOUNDARY\r\n\
            Content-Disposition: form-data; name=\"title\"\r\n\r\n\
            Buy milk\r\n\
            --XBOUNDARY\r\n\
            Content-Disposition: form-data; name=\"upload\"; filename=\"a.txt\"\r\n\r\n\
            ignored\r\n\
            --XBOUNDARY\r\n\
            Content-Disposition: form-data; name=\"completed\"\r\n\r\n\
            1\r\n\
            --XBOUNDARY--\r\n";
        let request = Request::builder()
            .method("PUT")
            .header("content-type", "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .expect("request should build");

        let form = TodoForm::from_request(request, &())
            .await
            .expect("extraction is infallible");
        assert_eq!(form.title, "Buy milk");
        assert_eq!(form.completed_flag(), 1);
    }

    #[tokio::test]
    async fn broken_multipart_reads_as_empty() {
        let request = Request::builder()
            .method("POST")
            .header("content-type", "multipart/form-data")
            .body(Body::from("title=Buy+milk"))
            .expect("request should build");

        let form = TodoForm::from_request(request, &())
            .await
            .expect("extraction is infallible");
        assert_eq!(form, TodoForm::default());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let form = TodoForm::from_pairs([
            ("colour".to_string(), "red".to_string()),
            ("completed".to_string(), "1".to_string()),
        ]);
        assert_eq!(form.title, "");
        assert_eq!(form.completed, "1");
    }

    #[tokio::test]
    async fn non_form_bodies_read_as_empty() {
        let request = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"title":"x"}"#))
            .expect("request should build");

        let form = TodoForm::from_request(request, &())
            .await
            .expect("extraction is infallible");
        assert_eq!(form, TodoForm::default());
    }
}
