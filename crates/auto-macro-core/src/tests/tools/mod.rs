mod key_presser;
