use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrandlensError {
    #[error("brand name is blank")]
    BlankBrandName,

    #[error("no brand domains configured")]
    EmptyBrandDomains,
}
