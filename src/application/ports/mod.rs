pub mod document_ports;
pub mod storage_ports;
