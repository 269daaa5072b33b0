pub(crate) mod binder;
pub(crate) mod expression;
pub(crate) mod slots;
