#![allow(unused_crate_dependencies)]

use graphql_cost::{calculate_cost, extract_costs, CostOptions, COST_DIRECTIVE, TOKEN_UNIT_COST};
use indoc::{formatdoc, indoc};
use serde_json::json;

#[test]
fn complexity() {
    let schema = formatdoc! {"
        {COST_DIRECTIVE}
        type Deal {{
          org: Integer @cost(complexity: 4)
        }}
    "};

    let extracted = extract_costs(&schema).unwrap();

    assert_eq!(
        extracted.clean_schema,
        indoc! {"
            type Deal {
              org: Integer
            }
        "}
    );
    assert_eq!(
        serde_json::to_value(&extracted.cost_map).unwrap(),
        json!({ "Deal": { "org": { "complexity": 4.0 } } })
    );
}

#[test]
fn tokens_and_multipliers_on_type_extension() {
    let schema = formatdoc! {r#"
        {COST_DIRECTIVE}
        extend type User @key(fields: "id") {{
          id: ID! @external
          deals(limit: Int!): [Deal] @cost(complexity: 2, multipliers: ["limit"], db: 1)
          org: Organization @cost(complexity: 4, useMultipliers: false)
        }}
    "#};

    let extracted = extract_costs(&schema).unwrap();

    assert_eq!(
        extracted.clean_schema,
        indoc! {r#"
            extend type User @key(fields: "id") {
              id: ID! @external
              deals(limit: Int!): [Deal]
              org: Organization
            }
        "#}
    );
    assert_eq!(
        serde_json::to_value(&extracted.cost_map).unwrap(),
        json!({
            "User": {
                "deals": { "tokens": TOKEN_UNIT_COST, "complexity": 2.0, "multipliers": ["limit"] },
                "org": { "complexity": 4.0, "useMultipliers": false }
            }
        })
    );
}

#[test]
fn network_tokens() {
    let schema = formatdoc! {r#"
        {COST_DIRECTIVE}
        type Query {{
          deals(limit: Int!): [Deal] @cost(network: 2, multipliers: ["limit"])
        }}
    "#};

    let extracted = extract_costs(&schema).unwrap();

    assert_eq!(
        extracted.clean_schema,
        indoc! {"
            type Query {
              deals(limit: Int!): [Deal]
            }
        "}
    );
    assert_eq!(
        serde_json::to_value(&extracted.cost_map).unwrap(),
        json!({ "Query": { "deals": { "tokens": 2.0 * TOKEN_UNIT_COST, "multipliers": ["limit"] } } })
    );
}

#[test]
fn network_and_db_tokens_accumulate() {
    let extracted = extract_costs("type Query { deals: [Deal] @cost(network: 2, db: 3) }").unwrap();

    let spec = extracted.cost_map.get("Query", "deals").unwrap();

    assert_eq!(spec.tokens, Some(500.0));
}

#[test]
fn provides_and_invalid_arguments() {
    let schema = formatdoc! {r#"
        {COST_DIRECTIVE}

        type Organization {{
          id: ID!
          name: String! @cost
          users: [User] @cost(multipliers: "limit", provides: "id") # should be array of strings
        }}

        type Deal {{
          id: ID!
          title: String! @cost(multipliers: [])
          org: Organization @cost(complexity: 2, provides: ["id", "name"])
        }}

        schema {{
          query: Query
        }}
    "#};

    let extracted = extract_costs(&schema).unwrap();

    assert_eq!(
        extracted.clean_schema,
        indoc! {"
            type Organization {
              id: ID!
              name: String!
              users: [User] # should be array of strings
            }

            type Deal {
              id: ID!
              title: String!
              org: Organization
            }

            schema {
              query: Query
            }
        "}
    );
    assert_eq!(
        serde_json::to_value(&extracted.cost_map).unwrap(),
        json!({ "Deal": { "org": { "complexity": 2.0, "provides": ["id", "name"] } } })
    );
}

#[test]
fn cost_map_snapshot() {
    let schema = formatdoc! {r#"
        {COST_DIRECTIVE}
        type Query {{
          tree: [Leaf] @cost(complexity: 3, multipliers: ["first", 2], recursionMultiplier: 1.5)
        }}

        type Leaf {{
          leafs(first: Int = 10): [Leaf] @cost(useMultipliers: true, multipliers: ["first"])
        }}
    "#};

    let extracted = extract_costs(&schema).unwrap();

    insta::assert_json_snapshot!(extracted.cost_map, @r###"
    {
      "Query": {
        "tree": {
          "complexity": 3.0,
          "multipliers": [
            "first",
            2.0
          ],
          "recursionMultiplier": 1.5
        }
      },
      "Leaf": {
        "leafs": {
          "multipliers": [
            "first"
          ],
          "useMultipliers": true
        }
      }
    }
    "###);
}

#[test]
fn extracted_schema_and_costs_drive_the_calculation() {
    let schema = formatdoc! {r#"
        {COST_DIRECTIVE}
        type Query {{
          deals(limit: Int = 5): [Deal] @cost(complexity: 2, multipliers: ["limit"], network: 1)
        }}

        type Deal {{
          id: ID!
          org: Organization @cost(complexity: 3)
        }}

        type Organization {{
          id: ID!
        }}
    "#};

    let extracted = extract_costs(&schema).unwrap();
    let options = CostOptions::default().with_cost_map(&extracted.cost_map);

    let cost = calculate_cost("{ deals { id org { id } } }", &extracted.clean_schema, &options).unwrap();

    // deals: 2 * 5 + 100, id: 1, org: 3 * 5, org.id: 1
    assert_eq!(cost, 110.0 + 1.0 + 15.0 + 1.0);
}

#[test]
fn schema_without_annotations_is_only_tidied() {
    let extracted = extract_costs("type Query {\n  a: Int   \n}").unwrap();

    assert!(extracted.cost_map.is_empty());
    assert_eq!(extracted.clean_schema, "type Query {\n  a: Int\n}\n");
}

#[test]
fn annotated_federated_schema() {
    let schema = formatdoc! {r#"
        {COST_DIRECTIVE}
        type Query {{
          users(first: Int = 5): [User] @cost(complexity: 1, multipliers: ["first"])
        }}

        type User @key(fields: "id") {{
          id: ID! @external
          deals(limit: Int = 10): [Deal] @deprecated(reason: "use dealsPage") @cost(complexity: 2, multipliers: ["limit"])
          org: Organization @cost(provides: ["id"]) @shareable
        }}

        type Deal @key(fields: "id") {{
          id: ID!
        }}

        type Organization {{
          id: ID!
        }}
    "#};

    let extracted = extract_costs(&schema).unwrap();

    assert_eq!(
        extracted.clean_schema,
        indoc! {r#"
            type Query {
              users(first: Int = 5): [User]
            }

            type User @key(fields: "id") {
              id: ID! @external
              deals(limit: Int = 10): [Deal] @deprecated(reason: "use dealsPage")
              org: Organization @shareable
            }

            type Deal @key(fields: "id") {
              id: ID!
            }

            type Organization {
              id: ID!
            }
        "#}
    );
    assert_eq!(extracted.cost_map.len(), 3);

    let reparsed = extract_costs(&extracted.clean_schema).unwrap();
    assert_eq!(reparsed.clean_schema, extracted.clean_schema);
    assert!(reparsed.cost_map.is_empty());

    let options = CostOptions::default().with_cost_map(&extracted.cost_map);
    let cost = calculate_cost("{ users { deals { id } org { id } } }", &extracted.clean_schema, &options).unwrap();

    // users: 1 * 5, deals: 2 * (10 * 5), deals.id: 1, org: 1 (provided), org.id: 1
    assert_eq!(cost, 5.0 + 100.0 + 1.0 + 1.0 + 1.0);
}

#[test]
fn block_strings_in_lists() {
    let extracted =
        extract_costs("type A {\n  b: B @cost(provides: [\"\"\"id\"\"\"], multipliers: [\"\"\"\n    first\n  \"\"\", 2])\n}\ntype B { id: ID }")
            .unwrap();

    insta::assert_json_snapshot!(extracted.cost_map, @r###"
    {
      "A": {
        "b": {
          "multipliers": [
            "first",
            2.0
          ],
          "provides": [
            "id"
          ]
        }
      }
    }
    "###);
    assert_eq!(extracted.clean_schema, "type A {\n  b: B\n}\ntype B { id: ID }\n");
}
