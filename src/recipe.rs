//! Built-in recipe preparing a host for the system-probe test suite

use declarative::PlatformFamily::{Amazon, Centos, Debian, Fedora, Redhat, Ubuntu};
use declarative::{ExecutionPlan, Step};

const EMBEDDED_BIN: &str = "/opt/datadog-agent/embedded/bin";
const EMBEDDED_INCLUDE: &str = "/opt/datadog-agent/embedded/include";
const BTF_DIR: &str = "/tmp/system-probe-tests/pkg/ebpf/bytecode/build/co-re/btf";
const GO_BIN: &str = "/go/bin";
const JUNIT_DIR: &str = "/tmp/junit";

/// Executable mode for staged helper binaries
const EXEC_MODE: u32 = 0o744;
/// Read-only mode for CI metadata files
const READ_ONLY_MODE: u32 = 0o444;

/// Build the system-probe host plan for a kernel release
///
/// The release names the kernel header package, so it is read once by the
/// caller and passed in.
pub fn system_probe(kernel_release: &str) -> ExecutionPlan {
    ExecutionPlan::new()
        .step(
            Step::command("apt-get update")
                .named("update apt repositories")
                .only_on(&[Ubuntu, Debian]),
        )
        .step(
            Step::command("yum -y update")
                .named("update yum repositories")
                .run_as("root")
                .only_on(&[Amazon]),
        )
        .step(
            Step::package("kernel headers")
                .on_families(
                    &[Redhat, Centos, Fedora, Amazon],
                    format!("kernel-devel-{kernel_release}"),
                )
                .on_families(&[Ubuntu, Debian], format!("linux-headers-{kernel_release}")),
        )
        .step(Step::package("python3"))
        .step(Step::package("iptables").only_on(&[Centos, Redhat]))
        .step(Step::package("conntrack"))
        .step(
            Step::package("netcat")
                .on(Amazon, "nmap-ncat")
                .on_families(&[Redhat, Centos, Fedora], "nc")
                .otherwise("netcat"),
        )
        .step(Step::package("socat"))
        .step(Step::package("wget"))
        .step(
            Step::package("curl")
                .on_version(Amazon, "2022", "curl-minimal")
                .otherwise("curl"),
        )
        // Installed again for every family; the second pass is a no-op where
        // the first already ran.
        .step(Step::package("iptables"))
        .step(Step::kernel_module("ipv6"))
        .step(Step::command("sysctl net.ipv6.conf.all.disable_ipv6=0"))
        .step(
            Step::command(
                "iptables -I INPUT 1 -m conntrack --ctstate NEW,RELATED,ESTABLISHED -j ACCEPT",
            )
            .named("ensure conntrack is enabled")
            .run_as("root"),
        )
        .step(
            Step::command("systemctl disable --now firewalld")
                .named("disable firewalld on redhat")
                .run_as("root")
                .ignore_failure()
                .only_on(&[Redhat]),
        )
        .step(Step::directory(EMBEDDED_BIN))
        .step(Step::directory(EMBEDDED_INCLUDE))
        .step(Step::directory(BTF_DIR))
        .step(staged(EMBEDDED_BIN, "clang-bpf").mode(EXEC_MODE))
        .step(staged(EMBEDDED_BIN, "llc-bpf").mode(EXEC_MODE))
        .step(staged(BTF_DIR, "minimized-btfs.tar.xz"))
        .step(Step::directory(GO_BIN))
        .step(staged(GO_BIN, "gotestsum").mode(EXEC_MODE))
        .step(staged(GO_BIN, "test2json").mode(EXEC_MODE))
        .step(Step::directory(JUNIT_DIR))
        .step(
            staged(JUNIT_DIR, "job_url.txt")
                .mode(READ_ONLY_MODE)
                .ignore_failure(),
        )
        .step(staged(JUNIT_DIR, "tags.txt").mode(READ_ONLY_MODE).ignore_failure())
        .step(Step::directory("/tmp/testjson"))
        .step(Step::directory("/tmp/pkgjson"))
}

/// File step placing artifact `source` under `dir` with the same name
fn staged(dir: &str, source: &str) -> Step {
    Step::file(format!("{dir}/{source}"), source)
}
