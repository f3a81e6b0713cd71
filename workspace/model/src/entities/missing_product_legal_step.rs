use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "missing_product_legal_steps")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub missing_product_legal_id: i32,
    pub step_number: i32,
    pub description: String,
    pub redirect_url: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::missing_product_legal::Entity",
        from = "Column::MissingProductLegalId",
        to = "super::missing_product_legal::Column::Id"
    )]
    MissingProductLegal,
}

impl Related<super::missing_product_legal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MissingProductLegal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
