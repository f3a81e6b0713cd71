use sea_orm::entity::prelude::*;

/// One remediation step for obtaining a missing business document.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "missing_legal_steps")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub missing_legal_id: i32,
    /// 1-based position within the parent's step list.
    pub step_number: i32,
    pub description: String,
    pub redirect_url: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::missing_legal::Entity",
        from = "Column::MissingLegalId",
        to = "super::missing_legal::Column::Id"
    )]
    MissingLegal,
}

impl Related<super::missing_legal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MissingLegal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
