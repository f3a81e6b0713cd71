use sea_orm::entity::prelude::*;

/// One projected year. Figures are estimates and kept as floating point.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "business_projection_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub projection_id: i32,
    pub year: i32,
    pub revenue: f64,
    pub expenses: f64,
    pub net_income: f64,
    pub cash_flow: f64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::business_projection::Entity",
        from = "Column::ProjectionId",
        to = "super::business_projection::Column::Id"
    )]
    Projection,
}

impl Related<super::business_projection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
