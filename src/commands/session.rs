use crate::config::Config;
use crate::error::Result;
use crate::output::{is_json_output, print_message};

use super::open_store;

pub async fn create(config: &Config, user: &str) -> Result<()> {
    let store = open_store(config).await?;
    let token = store.create_session(user).await?;

    if is_json_output() {
        println!("{}", serde_json::json!({ "user": user, "token": token }));
    } else {
        println!("Session token for {user}:");
        println!("{token}");
        println!();
        println!("Send it as 'Authorization: Bearer <token>' to the API.");
    }
    Ok(())
}

pub async fn revoke(config: &Config, token: &str) -> Result<()> {
    let store = open_store(config).await?;
    if store.revoke_session(token).await? {
        print_message("Session revoked");
    } else {
        print_message("No such session");
    }
    Ok(())
}
