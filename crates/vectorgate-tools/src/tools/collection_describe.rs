//! Collection Describe Tool
//!
//! Returns the canonicalized (fully serializable) collection
//! description.

use serde::Deserialize;
use serde_json::{json, Value};

use vectorgate_core::ClientFacade;

use crate::envelope;

pub const OPERATION: &str = "collection_describe";

/// Input schema for the collection_describe tool
pub fn schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "collection_name": {
                "type": "string",
                "description": "Name of the collection to describe"
            }
        },
        "required": ["collection_name"]
    })
}

#[derive(Debug, Deserialize)]
struct Args {
    collection_name: String,
}

pub fn execute(facade: &mut ClientFacade, args: Value) -> Value {
    let args: Args = match serde_json::from_value(args) {
        Ok(args) => args,
        Err(e) => return envelope::invalid_params(OPERATION, e),
    };

    match facade.describe_collection(&args.collection_name) {
        Ok(description) => envelope::success(
            OPERATION,
            json!({
                "collection_name": args.collection_name,
                "description": description,
            }),
        ),
        Err(e) => envelope::failure(OPERATION, &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::tests::memory_facade;
    use vectorgate_core::CollectionConfig;

    #[test]
    fn test_describe_existing() {
        let mut facade = memory_facade();
        facade
            .create_collection(&CollectionConfig::dense("docs", 16))
            .unwrap();
        let result = execute(&mut facade, json!({"collection_name": "docs"}));
        assert_eq!(result["success"], true);
        assert_eq!(result["description"]["collection_name"], "docs");
    }

    #[test]
    fn test_describe_missing_is_not_found() {
        let mut facade = memory_facade();
        let result = execute(&mut facade, json!({"collection_name": "ghost"}));
        assert_eq!(result["success"], false);
        assert_eq!(result["error_type"], "ResourceNotFoundError");
    }
}
