//! Document trait.

use crate::{builder::QueryBuilder, client::ElasticClient};
use serde::{Serialize, de::DeserializeOwned};

/// Trait for documents stored in a fixed index.
///
/// # Example
///
/// ```rust,no_run
/// use elastic_fluent::{ClientConfig, Document, ElasticClient};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct Product {
///     name: String,
///     price: f64,
///     category: String,
/// }
///
/// impl Document for Product {
///     fn index_name() -> &'static str {
///         "products"
///     }
/// }
///
/// # async fn run() -> elastic_fluent::Result<()> {
/// let client = ElasticClient::new(ClientConfig::default())?;
/// let books: Vec<Product> = Product::query(&client)
///     .where_keyword("category", "books")
///     .get()
///     .await?
///     .sources_as()?;
/// # Ok(())
/// # }
/// ```
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    /// Returns the index name for this document type.
    fn index_name() -> &'static str;

    /// Query builder targeting this document's index.
    fn query(client: &ElasticClient) -> QueryBuilder {
        client.query().index(Self::index_name())
    }
}
