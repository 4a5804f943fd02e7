use crate::{handlers, AppState};
use axum::{
    routing::{get, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Declares the route table once: the router is built from it and `GET /docs`
/// lists it.
macro_rules! route_table {
    ($($method:ident $path:literal => $handler:ident),* $(,)?) => {
        /// Method and path of every route.
        pub const ROUTES: &[(&str, &str)] = &[$((stringify!($method), $path)),*];

        fn register(router: Router<AppState>) -> Router<AppState> {
            router$(.route($path, $method(handlers::$handler)))*
        }
    };
}

route_table! {
    get "/" => index,
    get "/docs" => docs,
    get "/health" => health,

    // Store
    get "/reset" => reset,
    get "/get_data_keys" => get_data_keys,
    put "/get_data" => get_data,

    // Documents
    put "/set_portf" => set_portf,
    put "/add_std_node" => add_std_node,
    put "/del_std_node" => del_std_node,
    put "/set_timegrid" => set_timegrid,
    put "/set_time_series_data" => set_time_series_data,

    // Portfolio assets
    put "/portf_add_asset" => portf_add_asset,
    put "/portf_delete_asset" => portf_delete_asset,
    put "/set_all_asset_parameters" => set_all_asset_parameters,
    put "/set_asset_parameter" => set_asset_parameter,
    put "/set_nodes_from_list" => set_nodes_from_list,

    // Introspection
    put "/get_asset_details" => get_asset_details,
    get "/get_portf_details" => get_portf_details,
    put "/get_object_details" => get_object_details,
    get "/get_network" => get_network,

    // Optimisation
    put "/set_solver" => set_solver,
    get "/optimize" => optimize,
}

pub fn create_router(state: AppState) -> Router {
    register(Router::new())
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(TraceLayer::new_for_http())
}
