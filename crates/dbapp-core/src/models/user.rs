use serde::{Deserialize, Serialize};

/// Identity returned by the SCIM `Me` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: Option<String>,
    #[serde(rename = "userName")]
    pub user_name: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    pub active: Option<bool>,
    #[serde(default)]
    pub emails: Vec<UserEmail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEmail {
    pub value: Option<String>,
    #[serde(default)]
    pub primary: bool,
}

impl UserInfo {
    pub fn user_name_or_unknown(&self) -> &str {
        self.user_name.as_deref().unwrap_or("unknown")
    }

    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(false)
    }

    pub fn primary_email(&self) -> Option<&str> {
        self.emails
            .iter()
            .find(|e| e.primary)
            .or_else(|| self.emails.first())
            .and_then(|e| e.value.as_deref())
    }
}
