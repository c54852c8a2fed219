use candbc_parser::{CollectingObserver, Parser, codec};

fn main() {
    let db_path: String = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demos/vehicle.dbc".to_string());

    let mut failures = CollectingObserver::new();
    let db = match Parser::new().observer(&mut failures).parse_path(&db_path) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };

    for failure in failures.failures() {
        eprintln!("warning: {}", failure);
    }

    println!(
        "Nodes: {:?}",
        db.nodes().iter().map(|n| &n.name).collect::<Vec<_>>()
    );
    println!("Messages: {}", db.message_count());
    for msg in db.messages() {
        println!(
            "Message Name: {}\nid = {}\ndlc = {}\ntransmitter = {}\ncycle_time = {:?}\n",
            msg.name,
            msg.id_hex(),
            msg.dlc,
            msg.transmitter,
            msg.cycle_time
        );
        for sig in &msg.signals {
            println!(
                "\tSignal Name: {}\n\tstart_bit = {}\n\tlength = {}\n\tbyte_order = {:?}\n\tvalue_kind = {:?}\n\tfactor = {}\n\toffset = {}\n\tmin = {}\n\tmax = {}\n\tunit = {}\n",
                sig.name, sig.start_bit, sig.length, sig.byte_order, sig.value_kind, sig.factor, sig.offset, sig.min, sig.max, sig.unit,
            );

            // Print Value Table if Present
            if !sig.value_table.is_empty() {
                println!("\tValue Table:");
                for (key, desc) in &sig.value_table {
                    println!("\t  {} => {}", key, desc);
                }
            }

            // Round trip the minimum through the codec
            let frame: u64 = codec::pack(sig.min, sig);
            println!(
                "\tmin packs to {:#018x}, unpacks to {}\n",
                frame,
                codec::unpack(frame, sig)
            );
        }
        println!("\n");
    }
}
