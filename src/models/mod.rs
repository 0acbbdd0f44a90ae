pub mod installment;
