pub mod documents;
pub mod flowcharts;

pub use documents::{
    CreateDocumentFields, DocumentAction, DocumentListResponse, DocumentResponse, DocumentSearch,
    LookupResponse, SubmitDocumentResponse,
};
pub use flowcharts::{
    CreateFlowchartRequest, FlowchartQuery, FlowchartResponse, GetFlowchartResponse,
    SaveFlowchartResponse, UpdateFlowchartRequest,
};
