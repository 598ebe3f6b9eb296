//! `multipart/form-data` request bodies for the upload endpoints.

const BOUNDARY_PREFIX: &str = "elysia-form-boundary-";

#[derive(Debug)]
enum Part<'a> {
    Text {
        name: &'a str,
        value: &'a str,
    },
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

impl Part<'_> {
    fn contains(&self, needle: &[u8]) -> bool {
        let haystack = match self {
            Part::Text { value, .. } => value.as_bytes(),
            Part::File { data, .. } => data,
        };
        haystack.windows(needle.len()).any(|window| window == needle)
    }
}

#[derive(Debug, Default)]
pub struct Form<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug)]
pub struct EncodedForm {
    pub content_type: String,
    pub body: Vec<u8>,
}

impl<'a> Form<'a> {
    pub fn new() -> Self {
        Form::default()
    }

    pub fn text(mut self, name: &'a str, value: &'a str) -> Self {
        self.parts.push(Part::Text { name, value });
        self
    }

    pub fn file(
        mut self,
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    ) -> Self {
        self.parts.push(Part::File {
            name,
            file_name,
            content_type,
            data,
        });
        self
    }

    pub fn encode(&self) -> EncodedForm {
        let boundary = self.boundary();
        let mut body = Vec::new();

        for part in &self.parts {
            body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
            match part {
                Part::Text { name, value } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                            escape(name)
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                },
                Part::File {
                    name,
                    file_name,
                    content_type,
                    data,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                            escape(name),
                            escape(file_name)
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(
                        format!("Content-Type: {}\r\n\r\n", content_type).as_bytes(),
                    );
                    body.extend_from_slice(data);
                },
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

        EncodedForm {
            content_type: format!("multipart/form-data; boundary={}", boundary),
            body,
        }
    }

    // The boundary must not occur inside any part.
    fn boundary(&self) -> String {
        (0u64..)
            .map(|n| format!("{}{:08x}", BOUNDARY_PREFIX, n))
            .find(|candidate| !self.parts.iter().any(|p| p.contains(candidate.as_bytes())))
            .unwrap_or_else(|| BOUNDARY_PREFIX.to_string())
    }
}

fn escape(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
