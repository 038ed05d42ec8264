use once_cell::sync::Lazy;

pub static LISTEN_ADDR: Lazy<String> = Lazy::new(|| {
    std::env::var("VIRTTY_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_owned())
});

// Namespace every VirtualMachine, Service and Ingress is created in.
pub static VM_NAMESPACE: Lazy<String> =
    Lazy::new(|| std::env::var("VIRTTY_NAMESPACE").unwrap_or_else(|_| "default".to_owned()));

// Public host the ingress controller serves. When unset, terminal URLs are
// returned as bare paths.
pub static INGRESS_HOST: Lazy<Option<String>> = Lazy::new(|| {
    std::env::var("VIRTTY_INGRESS_HOST")
        .ok()
        .filter(|host| !host.is_empty())
});
