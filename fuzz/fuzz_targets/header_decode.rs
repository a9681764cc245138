use honggfuzz::fuzz;
use solvedb::{read_header, write_header};

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            if let Ok((header, len)) = read_header(data) {
                assert!(len as usize <= data.len());
                let mut buf = Vec::new();
                write_header(&mut buf, &header).unwrap();
                let (again, _) = read_header(&buf[..]).unwrap();
                assert_eq!(again, header);
            }
        });
    }
}
