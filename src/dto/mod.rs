pub mod category_dto;
pub mod media_dto;
pub mod test_dto;
