use either::Either;
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::{DeleteParams, PostParams};
use kube::error::ErrorResponse;
use kube::{Api, Client};
use tracing::{info, warn};

use crate::builder::{build_ingress, build_service};
use crate::env::{INGRESS_HOST, VM_NAMESPACE};
use crate::error::ClusterError;
use crate::kubevirt::VirtualMachine;
use crate::metrics;
use crate::names;

#[derive(Clone)]
pub struct ClusterClient {
    client: Client,
    namespace: String,
}

impl ClusterClient {
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        ClusterClient {
            client,
            namespace: namespace.into(),
        }
    }

    pub async fn try_default() -> Result<Self, ClusterError> {
        let client = Client::try_default().await?;
        Ok(ClusterClient::new(client, VM_NAMESPACE.clone()))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub async fn create_vm(&self, vm: &VirtualMachine) -> Result<String, ClusterError> {
        let requested = vm.metadata.name.clone().unwrap_or_default();
        let vms: Api<VirtualMachine> = Api::namespaced(self.client.clone(), &self.namespace);
        let res = vms.create(&PostParams::default(), vm).await;
        metrics::observe_cluster_op("create_vm", res.is_ok());
        let created = res?;
        info!(vm = requested.as_str(), "created virtual machine");
        Ok(created.metadata.name.unwrap_or(requested))
    }

    // NotFound is surfaced like any other apiserver failure.
    pub async fn delete_vm(&self, name: &str) -> Result<(), ClusterError> {
        let vms: Api<VirtualMachine> = Api::namespaced(self.client.clone(), &self.namespace);
        let res = vms.delete(name, &DeleteParams::default()).await;
        metrics::observe_cluster_op("delete_vm", res.is_ok());
        match res? {
            Either::Left(_) => info!(vm = name, "deleting virtual machine"),
            Either::Right(_) => info!(vm = name, "deleted virtual machine"),
        }
        Ok(())
    }

    pub async fn create_service(&self, vm_name: &str) -> Result<String, ClusterError> {
        let services: Api<Service> = Api::namespaced(self.client.clone(), &self.namespace);
        let service = build_service(vm_name, &self.namespace);
        let res = services.create(&PostParams::default(), &service).await;
        metrics::observe_cluster_op("create_service", res.is_ok());
        let created = res?;
        info!(vm = vm_name, "created terminal service");
        Ok(created
            .metadata
            .name
            .unwrap_or_else(|| names::service_name(vm_name)))
    }

    pub async fn create_ingress(&self, vm_name: &str) -> Result<String, ClusterError> {
        let ingresses: Api<Ingress> = Api::namespaced(self.client.clone(), &self.namespace);
        let ingress = build_ingress(vm_name, &self.namespace);
        let res = ingresses.create(&PostParams::default(), &ingress).await;
        metrics::observe_cluster_op("create_ingress", res.is_ok());
        let created = res?;
        info!(vm = vm_name, "created terminal ingress");
        Ok(created
            .metadata
            .name
            .unwrap_or_else(|| names::ingress_name(vm_name)))
    }

    // Compensation path for expose_terminal. A service that is already
    // gone counts as deleted.
    async fn delete_service(&self, name: &str) -> Result<(), ClusterError> {
        let services: Api<Service> = Api::namespaced(self.client.clone(), &self.namespace);
        let res = services.delete(name, &DeleteParams::default()).await;
        metrics::observe_cluster_op("delete_service", res.is_ok());
        match res {
            Ok(Either::Left(_)) => {
                info!("deleting service {}", name);
                Ok(())
            }
            Ok(Either::Right(_)) => {
                info!("deleted service {}", name);
                Ok(())
            }
            Err(kube::Error::Api(ErrorResponse { code: 404, .. })) => Ok(()),
            Err(e) => Err(ClusterError(e)),
        }
    }

    // Creates the Service, then the Ingress bound to it by name. If the
    // Ingress fails the Service is removed again and the original error
    // is returned.
    pub async fn expose_terminal(&self, vm_name: &str) -> Result<String, ClusterError> {
        self.create_service(vm_name).await?;
        match self.create_ingress(vm_name).await {
            Ok(_) => Ok(names::terminal_url(INGRESS_HOST.as_deref(), vm_name)),
            Err(e) => {
                warn!(
                    vm = vm_name,
                    error = e.to_string().as_str(),
                    "ingress creation failed, removing the service again"
                );
                if let Err(de) = self.delete_service(&names::service_name(vm_name)).await {
                    warn!(
                        vm = vm_name,
                        error = de.to_string().as_str(),
                        "compensating service delete failed"
                    );
                }
                Err(e)
            }
        }
    }
}
