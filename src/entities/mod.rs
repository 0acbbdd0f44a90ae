pub mod installment_counter;
pub mod installment_item;
pub mod installment_order;
pub mod prelude;
