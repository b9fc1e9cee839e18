//! Test case composition from command-line flags

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};

use apicase_core::{ApiKeyLocation, Auth, AuthType, Method, TestCase};

/// Flags describing one test case.
#[derive(Args, Debug, Clone)]
pub struct CaseArgs {
    /// Target URL
    pub url: String,

    /// Test case name (default: "METHOD URL")
    #[arg(short, long)]
    pub name: Option<String>,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: Method,

    /// Request header, "Name: value" (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Raw body; sent as JSON when it parses, as text otherwise
    #[arg(short, long, conflicts_with = "form")]
    pub body: Option<String>,

    /// Form field, "key=value" (repeatable); sent as multipart/form-data
    #[arg(short = 'F', long)]
    pub form: Vec<String>,

    /// Bearer token
    #[arg(long, conflicts_with_all = ["basic", "api_key"])]
    pub bearer: Option<String>,

    /// Basic credentials, "user:password"
    #[arg(long, conflicts_with = "api_key")]
    pub basic: Option<String>,

    /// API key value
    #[arg(long)]
    pub api_key: Option<String>,

    /// API key parameter or header name
    #[arg(long, requires = "api_key")]
    pub api_key_name: Option<String>,

    /// Where the API key goes
    #[arg(long, default_value = "header")]
    pub api_key_in: KeyLocation,

    /// Expected status code (default: any 2xx)
    #[arg(short, long)]
    pub expect: Option<u16>,

    /// Response time limit in seconds; the request is aborted past it
    #[arg(long)]
    pub max_time: Option<f64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KeyLocation {
    Header,
    Query,
}

impl From<KeyLocation> for ApiKeyLocation {
    fn from(loc: KeyLocation) -> Self {
        match loc {
            KeyLocation::Header => ApiKeyLocation::Header,
            KeyLocation::Query => ApiKeyLocation::Query,
        }
    }
}

impl CaseArgs {
    /// Build the test case these flags describe.
    ///
    /// # Errors
    ///
    /// Returns error on a malformed header, form field, or basic credential.
    pub fn to_test_case(&self) -> Result<TestCase> {
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| format!("{} {}", self.method, self.url));
        let mut case = TestCase::new(name, self.url.clone())
            .with_method(self.method)
            .with_expected_status(self.expect)
            .with_max_response_time(self.max_time);

        for raw in &self.headers {
            let (key, value) = parse_pair(raw, ':').with_context(|| format!("header '{raw}'"))?;
            case = case.with_header(key, value);
        }

        if let Some(body) = &self.body {
            case = case.with_raw_body(body.clone());
        }
        for raw in &self.form {
            let (key, value) = parse_pair(raw, '=').with_context(|| format!("form field '{raw}'"))?;
            case = case.with_form_field(key, value);
        }

        if let Some(auth) = self.auth()? {
            case = case.with_auth(auth.0, auth.1);
        }
        Ok(case)
    }

    fn auth(&self) -> Result<Option<(AuthType, Auth)>> {
        if let Some(token) = &self.bearer {
            let auth = Auth {
                token: token.clone(),
                ..Auth::default()
            };
            return Ok(Some((AuthType::Bearer, auth)));
        }
        if let Some(basic) = &self.basic {
            let Some((username, password)) = basic.split_once(':') else {
                bail!("basic credentials must be 'user:password'");
            };
            let auth = Auth {
                username: username.to_string(),
                password: password.to_string(),
                ..Auth::default()
            };
            return Ok(Some((AuthType::Basic, auth)));
        }
        if let Some(key) = &self.api_key {
            let auth = Auth {
                api_key: key.clone(),
                api_key_location: self.api_key_in.into(),
                api_key_name: self.api_key_name.clone().unwrap_or_default(),
                ..Auth::default()
            };
            return Ok(Some((AuthType::ApiKey, auth)));
        }
        Ok(None)
    }
}

/// `"Accept: text/plain"` → `("Accept", "text/plain")`
fn parse_pair(raw: &str, sep: char) -> Result<(String, String)> {
    let Some((key, value)) = raw.split_once(sep) else {
        bail!("expected 'key{sep}value'");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("empty key");
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Resolve a test case by exact id or unique id prefix.
///
/// # Errors
///
/// Returns error if nothing matches or the prefix is ambiguous.
pub fn find_case<'a>(cases: &'a [TestCase], id: &str) -> Result<&'a TestCase> {
    if let Some(exact) = cases.iter().find(|c| c.id == id) {
        return Ok(exact);
    }
    let matches: Vec<&TestCase> = cases.iter().filter(|c| c.id.starts_with(id)).collect();
    match matches.as_slice() {
        [one] => Ok(one),
        [] => bail!("no test case with id '{id}'"),
        _ => bail!("id prefix '{id}' matches {} test cases", matches.len()),
    }
}

/// Pick cases by id, keeping the order given; all cases when `ids` is empty.
///
/// # Errors
///
/// Returns error if any id cannot be resolved.
pub fn select_cases(cases: &[TestCase], ids: &[String]) -> Result<Vec<TestCase>> {
    if ids.is_empty() {
        return Ok(cases.to_vec());
    }
    ids.iter()
        .map(|id| find_case(cases, id).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use apicase_core::{BodyType, KeyValue};
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        case: CaseArgs,
    }

    fn parse(args: &[&str]) -> CaseArgs {
        let mut argv = vec!["apicase"];
        argv.extend_from_slice(args);
        Harness::try_parse_from(argv).unwrap().case
    }

    #[test]
    fn defaults_to_get_with_label_name() {
        let case = parse(&["https://api.example.com/ok"]).to_test_case().unwrap();
        assert_eq!(case.method, Method::Get);
        assert_eq!(case.case_name, "GET https://api.example.com/ok");
        assert_eq!(case.expected_status, None);
        assert_eq!(case.auth_type, AuthType::None);
    }

    #[test]
    fn headers_body_and_expectations() {
        let case = parse(&[
            "https://api.example.com/users",
            "-X",
            "post",
            "-n",
            "Create user",
            "-H",
            "Accept: application/json",
            "-b",
            r#"{"name":"a"}"#,
            "-e",
            "201",
            "--max-time",
            "1.5",
        ])
        .to_test_case()
        .unwrap();

        assert_eq!(case.method, Method::Post);
        assert_eq!(case.case_name, "Create user");
        assert_eq!(case.headers, vec![KeyValue::new("Accept", "application/json")]);
        assert_eq!(case.raw_body, r#"{"name":"a"}"#);
        assert_eq!(case.expected_status, Some(201));
        assert_eq!(case.max_response_time, Some(1.5));
    }

    #[test]
    fn form_fields_switch_body_type() {
        let case = parse(&["http://h/upload", "-X", "POST", "-F", "a=1", "-F", "b=x=y"])
            .to_test_case()
            .unwrap();
        assert_eq!(case.body_type, BodyType::FormData);
        assert_eq!(case.form_data[1], KeyValue::new("b", "x=y"));
    }

    #[test]
    fn api_key_in_query() {
        let case = parse(&[
            "https://x.com/y",
            "--api-key",
            "abc",
            "--api-key-name",
            "token",
            "--api-key-in",
            "query",
        ])
        .to_test_case()
        .unwrap();
        assert_eq!(case.auth_type, AuthType::ApiKey);
        assert_eq!(case.auth.api_key_location, ApiKeyLocation::Query);
        assert_eq!(case.auth.api_key_name, "token");
    }

    #[test]
    fn basic_requires_colon() {
        let err = parse(&["http://h/", "--basic", "nocolon"])
            .to_test_case()
            .unwrap_err();
        assert!(err.to_string().contains("user:password"));
    }

    #[test]
    fn malformed_header_is_rejected() {
        assert!(parse(&["http://h/", "-H", "broken"]).to_test_case().is_err());
    }

    #[test]
    fn bearer_conflicts_with_basic() {
        let argv = ["apicase", "http://h/", "--bearer", "t", "--basic", "u:p"];
        assert!(Harness::try_parse_from(argv).is_err());
    }

    #[test]
    fn find_by_prefix() {
        let mut a = TestCase::new("a", "http://h/a");
        a.id = "abc-1".into();
        let mut b = TestCase::new("b", "http://h/b");
        b.id = "abd-2".into();
        let cases = vec![a, b];

        assert_eq!(find_case(&cases, "abc").unwrap().case_name, "a");
        assert_eq!(find_case(&cases, "abd-2").unwrap().case_name, "b");
        assert!(find_case(&cases, "ab").is_err());
        assert!(find_case(&cases, "zz").is_err());
    }

    #[test]
    fn select_keeps_requested_order() {
        let mut a = TestCase::new("a", "http://h/a");
        a.id = "1".into();
        let mut b = TestCase::new("b", "http://h/b");
        b.id = "2".into();
        let cases = vec![a, b];

        let picked = select_cases(&cases, &["2".to_string(), "1".to_string()]).unwrap();
        assert_eq!(picked[0].case_name, "b");
        assert_eq!(select_cases(&cases, &[]).unwrap().len(), 2);
    }
}
