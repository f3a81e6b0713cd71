use sea_orm::entity::prelude::*;

/// A product or service sold by a business.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub business_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    /// Cost of goods per unit (harga pokok penjualan).
    pub hpp: Option<Decimal>,
    pub revenue: Option<Decimal>,
    pub profit: Option<Decimal>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::business::Entity",
        from = "Column::BusinessId",
        to = "super::business::Column::Id"
    )]
    Business,
    #[sea_orm(has_many = "super::product_legal::Entity")]
    ProductLegal,
    #[sea_orm(has_many = "super::missing_product_legal::Entity")]
    MissingProductLegal,
}

impl Related<super::business::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Business.def()
    }
}

impl Related<super::product_legal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductLegal.def()
    }
}

impl Related<super::missing_product_legal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MissingProductLegal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
