use sea_orm::entity::prelude::*;

/// A filed compliance document (license, permit, certificate) of a business.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "legals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub business_id: i32,
    /// Document kind, e.g. "NIB" or "SIUP". Compared verbatim during reconciliation.
    pub legal_type: String,
    pub issued_by: Option<String>,
    pub issued_at: Option<Date>,
    pub valid_until: Option<Date>,
    pub file_name: Option<String>,
    pub file_url: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::business::Entity",
        from = "Column::BusinessId",
        to = "super::business::Column::Id"
    )]
    Business,
}

impl Related<super::business::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Business.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
