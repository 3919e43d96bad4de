//! Collection Drop Tool

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use vectorgate_core::ClientFacade;

use crate::envelope;

pub const OPERATION: &str = "collection_drop";

/// Input schema for the collection_drop tool
pub fn schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "collection_name": {
                "type": "string",
                "description": "Name of the collection to drop"
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

    // Report whether the collection was actually there; dropping an
    // absent collection is otherwise a no-op on the engine
    let existed = match facade.has_collection(&args.collection_name) {
        Ok(existed) => existed,
        Err(e) => return envelope::failure(OPERATION, &e),
    };

    info!(collection = %args.collection_name, "dropping collection");
    match facade.drop_collection(&args.collection_name) {
        Ok(()) => envelope::success(
            OPERATION,
            json!({
                "collection_name": args.collection_name,
                "existed": existed,
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
    fn test_drop_existing_and_absent() {
        let mut facade = memory_facade();
        facade
            .create_collection(&CollectionConfig::dense("docs", 4))
            .unwrap();

        let result = execute(&mut facade, json!({"collection_name": "docs"}));
        assert_eq!(result["success"], true);
        assert_eq!(result["existed"], true);

        let again = execute(&mut facade, json!({"collection_name": "docs"}));
        assert_eq!(again["success"], true);
        assert_eq!(again["existed"], false);
    }
}
