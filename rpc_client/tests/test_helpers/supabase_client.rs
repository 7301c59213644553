use rpc_client::config::{SUPABASE_SERVICE_ROLE_KEY, SUPABASE_URL};
use rpc_client::{Credentials, RpcClient};

///
/// Manages the secrets needed to reach the Supabase project used for integration testing.
///
/// Export `NEXT_PUBLIC_SUPABASE_URL` and `SUPABASE_SERVICE_ROLE_KEY` and run with
/// `cargo test -- --ignored`

pub(crate) fn get_supabase_url() -> String {
    std::env::var(SUPABASE_URL).unwrap_or_else(|_| {
        panic!("Environment variable {SUPABASE_URL} not set. Set it to something like 'https://abcdefgh.supabase.co'")
    })
}

pub(crate) fn get_service_key() -> String {
    std::env::var(SUPABASE_SERVICE_ROLE_KEY)
        .unwrap_or_else(|_| panic!("Environment variable {SUPABASE_SERVICE_ROLE_KEY} not set"))
}

pub fn create_rpc_client() -> RpcClient {
    RpcClient::new(get_supabase_url(), Credentials::ServiceKey(get_service_key()))
        .expect("Error initializing rpc client")
}
