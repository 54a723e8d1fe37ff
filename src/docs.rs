use crate::{handlers, models};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::get_status),
    components(
        schemas(models::DeviceState)
    )
)]
pub struct ApiDoc;
