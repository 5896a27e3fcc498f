use docket::collection::{Document, DocumentId};
use docket::errors::DocketResult;
use docket::filter::field;
use docket::query::QueryPlan;
use docket::repository::{DeltaOp, Entity};
use docket::validation::{FieldRule, Schema};
use docket::{Convertible, SortOrder};
use docket_int_test::test_util::{cleanup, create_test_context, run_test};

#[derive(Debug, Clone, PartialEq)]
struct Supplier {
    id: Option<DocumentId>,
    name: String,
    rating: i64,
    regions: Vec<String>,
}

impl Entity for Supplier {
    fn collection_name() -> String {
        "suppliers".to_string()
    }

    fn schema() -> Schema {
        Schema::new()
            .field("name", FieldRule::string().required().min_length(2))
            .field("rating", FieldRule::integer().gte(1).lte(5))
            .field("regions", FieldRule::array().items(FieldRule::string()))
    }

    fn to_document(&self) -> DocketResult<Document> {
        let mut doc = Document::new();
        if let Some(id) = &self.id {
            doc.put("id", id.to_value()?)?;
        }
        doc.put("name", self.name.to_value()?)?;
        doc.put("rating", self.rating.to_value()?)?;
        doc.put("regions", self.regions.to_value()?)?;
        Ok(doc)
    }

    fn from_document(doc: &Document) -> DocketResult<Self> {
        Ok(Supplier {
            id: Option::<DocumentId>::from_value(&doc.get("id"))?,
            name: String::from_value(&doc.get("name"))?,
            rating: i64::from_value(&doc.get("rating"))?,
            regions: Vec::<String>::from_value(&doc.get("regions"))?,
        })
    }
}

fn supplier(name: &str, rating: i64) -> Supplier {
    Supplier {
        id: None,
        name: name.to_string(),
        rating,
        regions: vec!["eu".to_string()],
    }
}

#[test]
fn test_entity_lifecycle() {
    run_test(
        create_test_context,
        |ctx| {
            let suppliers = ctx.docket().entity_repository::<Supplier>()?;
            let created = suppliers.create(&supplier("Acme", 4))?;
            let id = created.id.clone().unwrap();
            assert_eq!(suppliers.get(&id)?, created);

            let mut changed = created.clone();
            changed.rating = 5;
            assert_eq!(suppliers.update(&id, &changed)?.rating, 5);

            let updated = suppliers.apply_delta(&id, &[DeltaOp::add_unique("regions", "us")])?;
            assert_eq!(updated.regions, vec!["eu".to_string(), "us".to_string()]);

            suppliers.delete(&id, true)?;
            assert!(suppliers.get(&id).unwrap_err().is_not_found());
            assert_eq!(suppliers.reactivate(&id)?.name, "Acme");
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_entity_validation_and_listing() {
    run_test(
        create_test_context,
        |ctx| {
            let suppliers = ctx.docket().entity_repository::<Supplier>()?;
            let err = suppliers.create(&supplier("A", 9)).unwrap_err();
            assert!(err.has_violation_for("name"));
            assert!(err.has_violation_for("rating"));

            suppliers.create_many(&[supplier("Acme", 4), supplier("Bolt Co", 2), supplier("Cogs", 5)])?;
            let (items, meta) = suppliers.list(
                &QueryPlan::new()
                    .filter(field("rating").gte(3))
                    .sort_by("rating", SortOrder::Descending),
            )?;
            assert_eq!(meta.total_count, 2);
            assert_eq!(
                items.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
                vec!["Cogs", "Acme"]
            );
            assert_eq!(suppliers.count(&field("regions").eq("eu"))?, 3);

            // the untyped view shares the same collection
            assert_eq!(suppliers.documents().name(), "suppliers");
            Ok(())
        },
        cleanup,
    )
}
