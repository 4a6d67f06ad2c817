use anyhow::Result;

/// A connection to an external collaborator, configured from the environment.
#[async_trait::async_trait]
pub trait ModuleClient: Clone + Send + Sync + 'static {
    const NAME: &'static str;
    type Client;

    /// Names of the required environment variables that are not set.
    fn missing_env() -> Vec<&'static str>;
    fn validate_env() -> bool;
    async fn setup_connection() -> Result<Self>;

    fn from_client(client: Self::Client) -> Self;
    fn get_client(&self) -> &Self::Client;
}

#[macro_export]
macro_rules! define_module_client {
    {
        (struct $struct_name:ident, $client_name:expr)
        client_type: $client_type:ty,
        env: [ $( $env_var:literal ),* ],
        setup: $setup_logic:expr
    } => {
        #[derive(Clone)]
        pub struct $struct_name {
            client: Option<std::sync::Arc<$client_type>>,
        }

        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    client: None,
                }
            }
        }

        impl std::fmt::Debug for $struct_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($struct_name))
                    .field("connected", &self.client.is_some())
                    .finish()
            }
        }

        #[async_trait::async_trait]
        impl ::storytime_common::ModuleClient for $struct_name {
            const NAME: &'static str = $client_name;
            type Client = std::sync::Arc<$client_type>;

            fn missing_env() -> Vec<&'static str> {
                const ENV_VARS: &'static [&'static str] = &[ $( $env_var ),* ];
                ENV_VARS.iter().cloned().filter(|var| std::env::var(var).is_err()).collect()
            }

            fn validate_env() -> bool {
                let missing_vars = Self::missing_env();
                if missing_vars.is_empty() {
                    return true;
                }

                let vars_str = missing_vars.join(", ");
                tracing::error!("[Client: {}] Required environment variables are not set: [{}]", $client_name, &vars_str);
                false
            }

            async fn setup_connection() -> anyhow::Result<Self> {
                if !Self::validate_env() {
                    anyhow::bail!(
                        "[Client: {}] Required environment variables are not set: [{}]",
                        $client_name, Self::missing_env().join(", ")
                    );
                }

                let client_instance: $client_type = $setup_logic.await?;
                tracing::info!("[Client: {}] connected", $client_name);
                Ok(Self {
                    client: Some(std::sync::Arc::new(client_instance)),
                })
            }

            fn from_client(client: Self::Client) -> Self {
                Self { client: Some(client) }
            }

            fn get_client(&self) -> &Self::Client {
                self.client.as_ref().expect("Client not connected. Did you call setup_connection?")
            }
        }
    }
}
