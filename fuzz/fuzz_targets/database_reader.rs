use honggfuzz::fuzz;
use solvedb::DatabaseReader;
use std::io::Cursor;

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            if let Ok(mut reader) = DatabaseReader::new(Cursor::new(data.to_vec())) {
                for position in [0u64, 1, 255, 256, 4096] {
                    let _ = reader.record(position);
                }
            }
        });
    }
}
