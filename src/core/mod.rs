pub mod mapping;
pub mod moosend;
pub mod runner;

pub use crate::domain::model::{
    Credentials, EmailMarketingList, ErrorReport, FieldMapping, IntegrationField,
    IntegrationFormSettings, Submission, SubscriberPayload,
};
pub use crate::domain::ports::{
    ConfigProvider, EmailMarketing, ErrorReporter, HttpGateway, PayloadDelivery,
};
pub use crate::utils::error::Result;
