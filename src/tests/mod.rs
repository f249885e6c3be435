pub(crate) mod provider_failure;
