//! HTTP API module for the shift ledger.
//!
//! This module exposes the ledger operations as JSON endpoints: worker
//! registration, clock-in and clock-out, the open-shift listing, and the
//! administrative review, payroll and allowance correction routes.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AllowanceRequest, CloseShiftRequest, OpenShiftsQuery, PayrollRequest, RegisterWorkerRequest,
    ReviewQuery, ShiftRequest,
};
pub use response::{ApiError, ApiErrorResponse, NotificationView, ReviewView, ShiftView, ShiftWriteResponse};
pub use state::AppState;
