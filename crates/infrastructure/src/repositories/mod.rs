pub mod document_employee_repository;

pub use document_employee_repository::DocumentEmployeeRepository;
