//! Users command - CRUD and search over stored users.

use serde_json::{json, Value};

use super::{json_arg, print_json, scalar_arg, user_store};
use crate::cli::args::{SearchArgs, UsersAction, UsersArgs};
use crate::config::Config;
use crate::domain::SearchProps;
use crate::errors::AppResult;
use crate::services::{flat_object, PlainValue, UserManager, UserService};

/// Execute the users command
pub async fn execute(args: UsersArgs, config: Config) -> AppResult<()> {
    let (store, parser) = user_store(&config).await?;
    let service = UserManager::new(store, parser);

    match args.action {
        UsersAction::Create { data } => {
            let created = service.create_user(json_arg("data", &data)?).await?;
            print_json(&created)
        }
        UsersAction::Get { id } => print_json(&service.find_user(&id).await?),
        UsersAction::Update { id, data } => {
            let updated = service.update_user(&id, json_arg("data", &data)?).await?;
            print_json(&updated)
        }
        UsersAction::Delete { id } => {
            let deleted = service.delete_user(&id).await?;
            print_json(&json!({ "deleted": deleted }))
        }
        UsersAction::Search(search) => {
            let flat = search.flat;
            let result = service.search_users(search_props(search)?).await?;
            if flat {
                print_json(&result.map(|item| Value::Object(flat_object(&PlainValue::from(item)))))
            } else {
                print_json(&result)
            }
        }
    }
}

fn search_props(args: SearchArgs) -> AppResult<SearchProps> {
    let optional_json = |name: &str, raw: Option<String>| match raw {
        Some(raw) => json_arg(name, &raw),
        None => Ok(Value::Null),
    };

    Ok(SearchProps {
        page: scalar_arg(args.page),
        per_page: scalar_arg(args.per_page),
        sort: optional_json("sort", args.sort)?,
        filter: optional_json("filter", args.filter)?,
        attributes: args.attributes,
        include: Vec::new(),
        ignore_paging: args.ignore_paging,
    })
}
