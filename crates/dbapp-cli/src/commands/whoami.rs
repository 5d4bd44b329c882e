use anyhow::Result;
use dbapp_core::models::UserInfo;
use dbapp_core::AppContext;

fn render_user(user: &UserInfo) -> Vec<String> {
    let mut lines = vec![
        format!("User name:    {}", user.user_name_or_unknown()),
        format!("Display name: {}", user.display_name.as_deref().unwrap_or("-")),
        format!("Active:       {}", user.is_active()),
    ];
    if let Some(email) = user.primary_email() {
        lines.push(format!("Email:        {}", email));
    }
    lines
}

pub async fn run(ctx: &AppContext) -> Result<()> {
    let user = ctx.workspace()?.current_user().await?;
    for line in render_user(&user) {
        println!("{}", line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_fields_fall_back() {
        let user: UserInfo = serde_json::from_value(json!({})).unwrap();
        assert_eq!(
            render_user(&user),
            vec![
                "User name:    unknown".to_string(),
                "Display name: -".to_string(),
                "Active:       false".to_string(),
            ]
        );
    }

    #[test]
    fn primary_email_is_shown() {
        let user: UserInfo = serde_json::from_value(json!({
            "userName": "ada@example.com",
            "active": true,
            "emails": [{"value": "ada@example.com", "primary": true}]
        }))
        .unwrap();
        let lines = render_user(&user);
        assert_eq!(lines[2], "Active:       true");
        assert_eq!(lines[3], "Email:        ada@example.com");
    }
}
