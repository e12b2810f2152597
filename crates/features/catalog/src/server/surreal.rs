use super::store::{CatalogStore, Collection};
use crate::domain::{Brand, BrandId, BrandInput, Model};
use crate::error::{CatalogError, CatalogErrorExt};
use chrono::NaiveDate;
use serde::Deserialize;
use showroom_database::Database;
use tracing::{debug, instrument};

const BRAND_FIELDS: &str = "record::id(id) AS id, name, founded, logo";

#[derive(Debug, Deserialize)]
struct BrandRow {
    id: String,
    name: String,
    #[serde(default)]
    founded: Option<NaiveDate>,
    #[serde(default)]
    logo: Option<String>,
}

impl TryFrom<BrandRow> for Brand {
    type Error = CatalogError;

    fn try_from(row: BrandRow) -> Result<Self, CatalogError> {
        let id = BrandId::parse(&row.id)
            .ok_or_else(|| CatalogError::from(format!("stored brand id '{}' is malformed", row.id)))?;
        Ok(Self { id, name: row.name, founded: row.founded, logo: row.logo })
    }
}

#[derive(Debug, Deserialize)]
struct ModelRow {
    id: String,
    name: String,
    brand: String,
}

/// [`CatalogStore`] over the shared `SurrealDB` connection.
#[derive(Debug, Clone)]
pub struct SurrealStore {
    db: Database,
}

impl SurrealStore {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Runs `write` followed by a read of the brand, in one round trip.
    async fn write_then_read(
        &self,
        write: String,
        id: &BrandId,
        binds: Vec<(&'static str, String)>,
    ) -> Result<Option<Brand>, CatalogError> {
        let sql = format!(
            "{write}; SELECT {BRAND_FIELDS} FROM ONLY type::thing('brand', $id);"
        );
        let mut query = self.db.query(sql).bind(("id", id.as_str().to_owned()));
        for bind in binds {
            query = query.bind(bind);
        }

        let mut response = query.await?.check().context("Writing brand")?;
        let row: Option<BrandRow> = response.take(1).context("Reading written brand")?;
        row.map(Brand::try_from).transpose()
    }
}

/// `SET` clause for the editable brand fields. A missing date clears the field.
fn assignments(input: &BrandInput) -> (String, Vec<(&'static str, String)>) {
    let mut binds = vec![("name", input.name.clone())];
    let founded = match input.founded {
        Some(date) => {
            binds.push(("founded", date.format("%Y-%m-%d").to_string()));
            "$founded"
        }
        None => "NONE",
    };
    (format!("name = $name, founded = {founded}"), binds)
}

impl CatalogStore for SurrealStore {
    #[instrument(skip(self), level = "debug")]
    async fn brands(&self) -> Result<Vec<Brand>, CatalogError> {
        let mut response = self
            .db
            .query(format!("SELECT {BRAND_FIELDS} FROM brand ORDER BY name ASC"))
            .await?;
        let rows: Vec<BrandRow> = response.take(0).context("Listing brands")?;
        rows.into_iter().map(Brand::try_from).collect()
    }

    #[instrument(skip(self), level = "debug")]
    async fn brand(&self, id: &BrandId) -> Result<Option<Brand>, CatalogError> {
        let mut response = self
            .db
            .query(format!("SELECT {BRAND_FIELDS} FROM ONLY type::thing('brand', $id)"))
            .bind(("id", id.as_str().to_owned()))
            .await?;
        let row: Option<BrandRow> = response.take(0).context("Loading brand")?;
        row.map(Brand::try_from).transpose()
    }

    #[instrument(skip(self), level = "debug")]
    async fn brand_by_name(&self, name: &str) -> Result<Option<Brand>, CatalogError> {
        let mut response = self
            .db
            .query(format!("SELECT {BRAND_FIELDS} FROM brand WHERE name = $name LIMIT 1"))
            .bind(("name", name.to_owned()))
            .await?;
        let rows: Vec<BrandRow> = response.take(0).context("Looking up brand by name")?;
        rows.into_iter().next().map(Brand::try_from).transpose()
    }

    #[instrument(skip(self), level = "debug")]
    async fn models_of(&self, id: &BrandId) -> Result<Vec<Model>, CatalogError> {
        let mut response = self
            .db
            .query(
                "SELECT record::id(id) AS id, name, record::id(brand) AS brand FROM model \
                 WHERE brand = type::thing('brand', $id) ORDER BY name ASC",
            )
            .bind(("id", id.as_str().to_owned()))
            .await?;
        let rows: Vec<ModelRow> = response.take(0).context("Listing models of brand")?;

        rows.into_iter()
            .map(|row| {
                let brand = BrandId::parse(&row.brand).ok_or_else(|| {
                    CatalogError::from(format!("model '{}' has a malformed brand link", row.id))
                })?;
                Ok(Model { id: row.id, name: row.name, brand })
            })
            .collect()
    }

    #[instrument(skip(self), level = "debug")]
    async fn count(&self, collection: Collection) -> Result<u64, CatalogError> {
        let mut response = self
            .db
            .query("RETURN count(SELECT VALUE id FROM type::table($table))")
            .bind(("table", collection.table()))
            .await?;
        let count: Option<u64> = response.take(0).context("Counting records")?;
        Ok(count.unwrap_or_default())
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn insert_brand(&self, input: &BrandInput) -> Result<Brand, CatalogError> {
        let id = BrandId::generate();
        let (set, binds) = assignments(input);

        let brand = self
            .write_then_read(
                format!("CREATE type::thing('brand', $id) SET {set} RETURN NONE"),
                &id,
                binds,
            )
            .await?
            .ok_or_else(|| CatalogError::from("created brand could not be read back"))?;

        debug!(id = %brand.id, "Brand created");
        Ok(brand)
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn replace_brand(&self, id: &BrandId, input: &BrandInput) -> Result<Brand, CatalogError> {
        let (set, binds) = assignments(input);
        self.write_then_read(
            format!("UPDATE type::thing('brand', $id) SET {set} RETURN NONE"),
            id,
            binds,
        )
        .await?
        .ok_or_else(|| CatalogError::not_found(format!("brand '{id}'")))
    }

    #[instrument(skip(self))]
    async fn set_logo(&self, id: &BrandId, logo: &str) -> Result<Brand, CatalogError> {
        self.write_then_read(
            "UPDATE type::thing('brand', $id) SET logo = $logo RETURN NONE".to_owned(),
            id,
            vec![("logo", logo.to_owned())],
        )
        .await?
        .ok_or_else(|| CatalogError::not_found(format!("brand '{id}'")))
    }

    #[instrument(skip(self))]
    async fn remove_brand(&self, id: &BrandId) -> Result<(), CatalogError> {
        self.db
            .query("DELETE type::thing('brand', $id) RETURN NONE")
            .bind(("id", id.as_str().to_owned()))
            .await?
            .check()
            .context("Deleting brand")?;
        Ok(())
    }
}
