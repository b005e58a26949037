//! `SeaORM` entity definitions.

pub mod items;
pub mod sea_orm_active_enums;
pub mod stock_balances;
pub mod stock_movements;
pub mod warehouses;
