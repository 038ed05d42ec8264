use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, ServiceBackendPort,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use k8s_quantity_parser::QuantityParser;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use thiserror::Error;

use crate::kubevirt::{
    CloudInitNoCloudSource, ContainerDiskSource, Devices, Disk, DiskTarget, DomainSpec, Interface,
    InterfaceMasquerade, Network, PodNetwork, ResourceRequirements, VirtualMachine,
    VirtualMachineInstanceSpec, VirtualMachineInstanceTemplateSpec, VirtualMachineSpec, Volume,
};
use crate::names;

// Label KubeVirt stamps on every launcher pod; the Service selects on it.
pub(crate) const VM_NAME_LABEL: &str = "vm.kubevirt.io/name";

// Port ttyd listens on inside the guest.
pub(crate) const TERMINAL_PORT: i32 = 80;

const CONTAINER_DISK: &str = "containerdisk";
const CLOUD_INIT_DISK: &str = "cloudinitdisk";
const DEFAULT_NETWORK: &str = "default";
const VIRTIO_BUS: &str = "virtio";
const TERMINAL_USER: &str = "fedora";
const PASSWORD_LEN: usize = 16;

#[derive(Debug, Error)]
pub(crate) enum BuildError {
    #[error("invalid memory quantity {0:?}")]
    InvalidMemoryQuantity(String),
}

pub(crate) fn generate_password() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PASSWORD_LEN)
        .map(char::from)
        .collect()
}

// First-boot provisioning: set the terminal user's password and bring up
// ttyd on the terminal port.
fn cloud_init_user_data(password: &str) -> String {
    format!(
        r#"#cloud-config
user: {user}
password: {password}
chpasswd: {{ expire: False }}
packages:
  - ttyd
runcmd:
  - ["nohup", "ttyd", "-p", "{port}", "bash"]
"#,
        user = TERMINAL_USER,
        password = password,
        port = TERMINAL_PORT,
    )
}

pub(crate) fn build_virtual_machine(
    name: &str,
    image: &str,
    memory: &str,
    password: &str,
    namespace: &str,
) -> Result<VirtualMachine, BuildError> {
    let memory_request = Quantity(memory.to_owned());
    if !matches!(memory_request.to_bytes(), Ok(Some(_))) {
        return Err(BuildError::InvalidMemoryQuantity(memory.to_owned()));
    }

    let spec = VirtualMachineSpec {
        // Created stopped; powering machines on is a separate lifecycle
        // concern outside this API.
        running: Some(false),
        template: Some(VirtualMachineInstanceTemplateSpec {
            spec: Some(VirtualMachineInstanceSpec {
                domain: DomainSpec {
                    devices: Devices {
                        disks: vec![
                            Disk {
                                name: CONTAINER_DISK.to_owned(),
                                disk: Some(DiskTarget {
                                    bus: Some(VIRTIO_BUS.to_owned()),
                                }),
                            },
                            Disk {
                                name: CLOUD_INIT_DISK.to_owned(),
                                disk: Some(DiskTarget {
                                    bus: Some(VIRTIO_BUS.to_owned()),
                                }),
                            },
                        ],
                        interfaces: vec![Interface {
                            name: DEFAULT_NETWORK.to_owned(),
                            masquerade: Some(InterfaceMasquerade {}),
                        }],
                    },
                    resources: Some(ResourceRequirements {
                        requests: Some(BTreeMap::from([("memory".to_owned(), memory_request)])),
                        ..Default::default()
                    }),
                },
                networks: vec![Network {
                    name: DEFAULT_NETWORK.to_owned(),
                    pod: Some(PodNetwork {}),
                }],
                volumes: vec![
                    Volume {
                        name: CONTAINER_DISK.to_owned(),
                        container_disk: Some(ContainerDiskSource {
                            image: image.to_owned(),
                            image_pull_policy: Some("Always".to_owned()),
                        }),
                        ..Default::default()
                    },
                    Volume {
                        name: CLOUD_INIT_DISK.to_owned(),
                        cloud_init_no_cloud: Some(CloudInitNoCloudSource {
                            user_data: Some(cloud_init_user_data(password)),
                        }),
                        ..Default::default()
                    },
                ],
            }),
            ..Default::default()
        }),
    };

    let mut vm = VirtualMachine::new(name, spec);
    vm.metadata.namespace = Some(namespace.to_owned());
    Ok(vm)
}

pub(crate) fn build_service(vm_name: &str, namespace: &str) -> Service {
    Service {
        metadata: ObjectMeta {
            name: Some(names::service_name(vm_name)),
            namespace: Some(namespace.to_owned()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            selector: Some(BTreeMap::from([(
                VM_NAME_LABEL.to_owned(),
                vm_name.to_owned(),
            )])),
            ports: Some(vec![ServicePort {
                port: TERMINAL_PORT,
                target_port: Some(IntOrString::Int(TERMINAL_PORT)),
                protocol: Some("TCP".to_owned()),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub(crate) fn build_ingress(vm_name: &str, namespace: &str) -> Ingress {
    Ingress {
        metadata: ObjectMeta {
            name: Some(names::ingress_name(vm_name)),
            namespace: Some(namespace.to_owned()),
            ..Default::default()
        },
        spec: Some(IngressSpec {
            rules: Some(vec![IngressRule {
                http: Some(HTTPIngressRuleValue {
                    paths: vec![HTTPIngressPath {
                        path: Some(names::terminal_path(vm_name)),
                        path_type: "Prefix".to_owned(),
                        backend: IngressBackend {
                            service: Some(IngressServiceBackend {
                                name: names::service_name(vm_name),
                                port: Some(ServiceBackendPort {
                                    number: Some(TERMINAL_PORT),
                                    ..Default::default()
                                }),
                            }),
                            ..Default::default()
                        },
                    }],
                }),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}
