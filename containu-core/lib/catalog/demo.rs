use crate::models::{Container, ContainerImage, ContainerStatus, LogLevel, Network, Volume};

use super::ContentProvider;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const STREAM_MESSAGES: [&str; 7] = [
    "Application started successfully",
    "Processing request from 192.168.1.100",
    "Database connection established",
    "Cache hit for key: user_session_123",
    "Request completed in 45ms",
    "Memory usage: 234MB",
    "CPU usage: 12.5%",
];

const BACKLOG_MESSAGES: [(&str, LogLevel); 10] = [
    ("Initializing application...", LogLevel::Info),
    ("Configuration loaded successfully.", LogLevel::Info),
    ("Connecting to database at 192.168.1.100.", LogLevel::Info),
    ("Warning: High memory usage detected.", LogLevel::Warning),
    ("Database connection established.", LogLevel::Info),
    ("User 'admin' logged in.", LogLevel::Info),
    ("Error: Failed to process request #1234.", LogLevel::Error),
    ("Retrying request #1234...", LogLevel::Warning),
    ("Request #1234 processed successfully on retry.", LogLevel::Info),
    ("Shutting down application.", LogLevel::Info),
];

const LS_OUTPUT: &str = "total 64
drwxr-xr-x  1 root root  4096 Jul 26 12:00 .
drwxr-xr-x  1 root root  4096 Jul 26 12:00 ..
-rw-r--r--  1 root root   220 Jul 26 12:00 .bashrc
-rw-r--r--  1 root root  3771 Jul 26 12:00 .profile
drwxr-xr-x  2 root root  4096 Jul 26 12:00 app
drwxr-xr-x  2 root root  4096 Jul 26 12:00 bin
drwxr-xr-x  2 root root  4096 Jul 26 12:00 etc";

const PS_OUTPUT: &str = "USER       PID %CPU %MEM    VSZ   RSS TTY      STAT START   TIME COMMAND
root         1  0.0  0.1   4624  1024 ?        Ss   12:00   0:00 /bin/bash
root        42  0.2  0.5  12345  5678 ?        S    12:01   0:00 app";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The built-in demo catalog.
#[derive(Debug, Clone, Default)]
pub struct DemoCatalog;

/// A catalog with no seed resources. Message pools and shell output match [`DemoCatalog`].
#[derive(Debug, Clone, Default)]
pub struct EmptyCatalog;

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn container(
    name: &str,
    image: &str,
    status: ContainerStatus,
    uptime: &str,
    cpu_usage: f64,
    memory_usage: &str,
    ports: &[&str],
    networks: &[&str],
) -> Container {
    Container::builder()
        .name(name)
        .image(image)
        .status(status)
        .uptime(uptime)
        .cpu_usage(cpu_usage)
        .memory_usage(memory_usage)
        .ports(ports.iter().map(|p| p.to_string()).collect())
        .networks(networks.iter().map(|n| n.to_string()).collect())
        .build()
}

fn image(repository: &str, tag: &str, size: &str, created: &str) -> ContainerImage {
    ContainerImage::builder()
        .repository(repository)
        .tag(tag)
        .size(size)
        .created(created)
        .build()
}

fn volume(name: &str, size: &str, mount_point: &str) -> Volume {
    Volume::builder()
        .name(name)
        .driver("local")
        .size(size)
        .mount_point(mount_point)
        .build()
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl ContentProvider for DemoCatalog {
    fn containers(&self) -> Vec<Container> {
        use ContainerStatus::*;

        vec![
            container(
                "web-server-prod",
                "nginx:latest",
                Running,
                "2 days",
                5.3,
                "256 MB",
                &["80:80", "443:443"],
                &["bridge", "my-app-net"],
            ),
            container(
                "db-main",
                "postgres:14",
                Running,
                "5 days",
                12.1,
                "1.2 GB",
                &["5432:5432"],
                &["my-app-net"],
            ),
            container(
                "api-gateway",
                "traefik:v2.5",
                Running,
                "1 day",
                2.5,
                "128 MB",
                &["80:80"],
                &["bridge"],
            ),
            container(
                "redis-cache",
                "redis:6",
                Stopped,
                "N/A",
                0.0,
                "0 MB",
                &["6379:6379"],
                &["my-app-net"],
            ),
            container(
                "worker-node-1",
                "ubuntu:20.04",
                Error,
                "3 hours",
                99.0,
                "512 MB",
                &["22:22"],
                &["none"],
            ),
            container(
                "monitoring-stack",
                "prometheus:latest",
                Running,
                "12 hours",
                8.7,
                "450 MB",
                &["9090:9090"],
                &["bridge"],
            ),
            container(
                "dev-environment",
                "ubuntu:22.04",
                Stopped,
                "N/A",
                0.0,
                "0 MB",
                &[],
                &[],
            ),
            container(
                "caching-layer",
                "memcached:1.6",
                Running,
                "3 days",
                1.8,
                "64 MB",
                &["11211:11211"],
                &[],
            ),
        ]
    }

    fn images(&self) -> Vec<ContainerImage> {
        vec![
            image("nginx", "latest", "125 MB", "2 days ago"),
            image("postgres", "14", "300 MB", "5 days ago"),
            image("redis", "6", "45 MB", "12 hours ago"),
            image("ubuntu", "22.04", "72 MB", "1 week ago"),
            image("prometheus", "latest", "155 MB", "20 hours ago"),
        ]
    }

    fn networks(&self) -> Vec<Network> {
        vec![
            Network::builder()
                .name("bridge")
                .driver("bridge")
                .subnet("172.18.0.0/16")
                .build(),
            Network::builder()
                .name("host")
                .driver("host")
                .attachable(false)
                .build(),
            Network::builder()
                .name("none")
                .driver("null")
                .attachable(false)
                .internal(true)
                .build(),
            Network::builder()
                .name("ingress")
                .driver("overlay")
                .subnet("10.0.0.0/24")
                .scope("swarm")
                .build(),
            Network::builder()
                .name("my-app-net")
                .driver("bridge")
                .subnet("172.19.0.0/16")
                .build(),
        ]
    }

    fn volumes(&self) -> Vec<Volume> {
        vec![
            volume("postgres-data", "2.5 GB", "/var/lib/postgresql/data"),
            volume("wordpress-content", "5.1 GB", "/var/www/html"),
            volume("nextcloud-data", "15.0 GB", "/var/www/nextcloud"),
            volume("prometheus-storage", "8.2 GB", "/prometheus"),
        ]
    }

    fn backlog_messages(&self) -> Vec<(String, LogLevel)> {
        BACKLOG_MESSAGES
            .iter()
            .map(|(message, level)| (message.to_string(), *level))
            .collect()
    }

    fn stream_messages(&self) -> Vec<String> {
        STREAM_MESSAGES.iter().map(|m| m.to_string()).collect()
    }

    fn shell_output(&self, command: &str) -> String {
        let lowered = command.trim().to_lowercase();
        match lowered.as_str() {
            "ls" | "ls -la" => LS_OUTPUT.to_string(),
            "pwd" => "/app".to_string(),
            "whoami" => "root".to_string(),
            "ps" | "ps aux" => PS_OUTPUT.to_string(),
            cmd if cmd.contains("cat") => "File contents would appear here...".to_string(),
            cmd if cmd.contains("echo") => command.replace("echo ", "").replace('"', ""),
            _ => format!("Command '{}' executed successfully", command),
        }
    }
}

impl ContentProvider for EmptyCatalog {
    fn containers(&self) -> Vec<Container> {
        Vec::new()
    }

    fn images(&self) -> Vec<ContainerImage> {
        Vec::new()
    }

    fn networks(&self) -> Vec<Network> {
        Vec::new()
    }

    fn volumes(&self) -> Vec<Volume> {
        Vec::new()
    }

    fn backlog_messages(&self) -> Vec<(String, LogLevel)> {
        DemoCatalog.backlog_messages()
    }

    fn stream_messages(&self) -> Vec<String> {
        DemoCatalog.stream_messages()
    }

    fn shell_output(&self, command: &str) -> String {
        DemoCatalog.shell_output(command)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
