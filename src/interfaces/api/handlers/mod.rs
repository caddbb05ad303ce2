pub mod category_handler;
pub mod document_handler;
