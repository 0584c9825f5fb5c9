//! Devices command implementation.

use anyhow::Result;
use console::style;

use arvak_adapter_ionq::IonqBackend;

/// Execute the devices command.
pub fn execute() -> Result<()> {
    println!("{} IonQ devices:\n", style("Arvak").cyan().bold());

    for caps in IonqBackend::available_devices() {
        println!(
            "  {} {} {}",
            style("●").green(),
            style(&caps.name).bold(),
            if caps.is_simulator { "(simulator)" } else { "(hardware)" }
        );
        println!("    Qubits: {}", caps.num_qubits);
        println!("    Native gates: {}", caps.gate_set.native.join(", "));
        println!(
            "    Supported gates: {}, {}",
            caps.gate_set.single_qubit.join(", "),
            caps.gate_set.two_qubit.join(", ")
        );
        println!();
    }

    println!(
        "  Set {} or add api_key to ~/.arvak/ionq.yaml to submit jobs",
        style("IONQ_API_KEY").yellow()
    );
    Ok(())
}
