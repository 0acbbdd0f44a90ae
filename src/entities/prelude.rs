#![allow(unused_imports)]

pub use super::installment_counter::Entity as InstallmentCounter;
pub use super::installment_item::Entity as InstallmentItem;
pub use super::installment_order::Entity as InstallmentOrder;
