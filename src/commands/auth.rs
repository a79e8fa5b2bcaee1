//! Auth command - Sign-up and credential checks.

use serde_json::json;

use super::{json_arg, print_json, user_store};
use crate::cli::args::{AuthAction, AuthArgs};
use crate::config::Config;
use crate::errors::AppResult;
use crate::services::{AuthService, Authenticator};

/// Execute the auth command
pub async fn execute(args: AuthArgs, config: Config) -> AppResult<()> {
    let (store, parser) = user_store(&config).await?;
    let service = Authenticator::new(store, parser);

    let user = match args.action {
        AuthAction::SignUp { data } => service.sign_up(json_arg("data", &data)?).await?,
        AuthAction::SignIn { email, password } => {
            service
                .sign_in(json!({ "email": email, "password": password }))
                .await?
        }
    };
    print_json(&user)
}
