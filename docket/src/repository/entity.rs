use crate::collection::Document;
use crate::errors::DocketResult;
use crate::validation::Schema;

/// A typed model persisted through an
/// [`EntityRepository`](crate::repository::EntityRepository).
///
/// `to_document` maps only the model's own fields; the repository adds and
/// strips `id` and the lifecycle fields. `from_document` receives the stored
/// document, lifecycle fields included, and may read them with
/// [`Convertible`](crate::common::Convertible).
///
/// ```rust,ignore
/// struct Product { id: Option<DocumentId>, name: String, price: f64, cost: f64 }
///
/// impl Entity for Product {
///     fn collection_name() -> String { "products".to_string() }
///
///     fn schema() -> Schema {
///         Schema::new()
///             .field("name", FieldRule::string().required())
///             .field("price", FieldRule::number().required().gt(0))
///             .field("cost", FieldRule::number().required())
///             .rule(CrossFieldRule::greater_than("price", "cost"))
///     }
///
///     fn to_document(&self) -> DocketResult<Document> {
///         let mut doc = Document::new();
///         doc.put("name", self.name.to_value()?)?;
///         doc.put("price", self.price.to_value()?)?;
///         doc.put("cost", self.cost.to_value()?)?;
///         Ok(doc)
///     }
///
///     fn from_document(doc: &Document) -> DocketResult<Self> {
///         Ok(Product {
///             id: Option::<DocumentId>::from_value(&doc.get("id"))?,
///             name: String::from_value(&doc.get("name"))?,
///             price: f64::from_value(&doc.get("price"))?,
///             cost: f64::from_value(&doc.get("cost"))?,
///         })
///     }
/// }
/// ```
pub trait Entity: Sized + Send + Sync {
    /// The collection the entity is stored in.
    fn collection_name() -> String;

    /// The schema every stored entity satisfies.
    fn schema() -> Schema;

    fn to_document(&self) -> DocketResult<Document>;

    fn from_document(document: &Document) -> DocketResult<Self>;
}
