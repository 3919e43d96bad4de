//! Collection List Tool

use serde_json::{json, Value};

use vectorgate_core::ClientFacade;

use crate::envelope;

pub const OPERATION: &str = "collection_list";

/// Input schema for the collection_list tool
pub fn schema() -> Value {
    json!({
        "type": "object",
        "properties": {}
    })
}

pub fn execute(facade: &mut ClientFacade, _args: Value) -> Value {
    match facade.list_collections() {
        Ok(collections) => {
            let count = collections.len();
            envelope::success(
                OPERATION,
                json!({
                    "collections": collections,
                    "count": count,
                }),
            )
        }
        Err(e) => envelope::failure(OPERATION, &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::tests::memory_facade;
    use vectorgate_core::CollectionConfig;

    #[test]
    fn test_list_empty_and_populated() {
        let mut facade = memory_facade();
        let result = execute(&mut facade, json!({}));
        assert_eq!(result["success"], true);
        assert_eq!(result["count"], 0);

        facade
            .create_collection(&CollectionConfig::dense("docs", 4))
            .unwrap();
        let result = execute(&mut facade, json!({}));
        assert_eq!(result["collections"], json!(["docs"]));
    }
}
