//! Request context classification
//!
//! Maps the raw request URI onto the protection context whose IP policy applies.
//! Matching is a plain, case-sensitive prefix test with no normalisation: operators
//! must enter paths exactly as the server reports them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Path prefix of the login page
pub const LOGIN_PATH: &str = "/wp-login.php";
/// Path prefix of the signup page
pub const SIGNUP_PATH: &str = "/wp-signup.php";
/// Path prefix of the XML-RPC endpoint
pub const XMLRPC_PATH: &str = "/xmlrpc.php";

/// Protection context of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestContext {
    Login,
    Signup,
    XmlRpc,
    Global,
}

impl RequestContext {
    /// Contexts tied to a fixed path, in classification order
    pub const PATH_CONTEXTS: [RequestContext; 3] = [
        RequestContext::Login,
        RequestContext::Signup,
        RequestContext::XmlRpc,
    ];

    /// Classify a request URI. First matching prefix wins; anything else is `Global`.
    pub fn classify(uri: &str) -> Self {
        Self::PATH_CONTEXTS
            .into_iter()
            .find(|context| {
                context
                    .path_prefix()
                    .is_some_and(|prefix| uri.starts_with(prefix))
            })
            .unwrap_or(RequestContext::Global)
    }

    /// Fixed path prefix of the context (`None` for `Global`)
    pub fn path_prefix(&self) -> Option<&'static str> {
        match self {
            RequestContext::Login => Some(LOGIN_PATH),
            RequestContext::Signup => Some(SIGNUP_PATH),
            RequestContext::XmlRpc => Some(XMLRPC_PATH),
            RequestContext::Global => None,
        }
    }

    /// Whether deny-all in this context can be lifted with the lockdown passcode
    pub fn supports_bypass(&self) -> bool {
        matches!(self, RequestContext::Login)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestContext::Login => "login",
            RequestContext::Signup => "signup",
            RequestContext::XmlRpc => "xmlrpc",
            RequestContext::Global => "global",
        }
    }
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
